use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::{Days, Local, NaiveDate};

use campsite::clock::{Clock, ManualClock};
use campsite::config::CampsiteConfig;
use campsite::guard::{AvailabilityGuard, CampsiteError};
use campsite::model::*;
use campsite::service::ReservationService;
use campsite::store::InMemoryStore;

fn setup(config: &CampsiteConfig, today: NaiveDate) -> (Arc<ManualClock>, ReservationService) {
    let clock = Arc::new(ManualClock::new(today));
    let store = Arc::new(InMemoryStore::new());
    let guard = Arc::new(AvailabilityGuard::new(
        config.window_days,
        clock.clone(),
        store,
    ));
    (clock, ReservationService::new(guard, config.date_rules()))
}

fn request(arrival: NaiveDate, nights: u64) -> NewReservation {
    NewReservation {
        email: "bench@example.com".into(),
        full_name: "Bench Camper".into(),
        arrival,
        departure: arrival + Days::new(nights.saturating_sub(1)),
    }
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    let us = |d: Duration| d.as_secs_f64() * 1_000_000.0;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.1}us, p50={:.1}us, p95={:.1}us, p99={:.1}us, max={:.1}us",
        latencies.len(),
        us(avg),
        us(percentile(latencies, 50.0)),
        us(percentile(latencies, 95.0)),
        us(percentile(latencies, 99.0)),
        us(latencies[latencies.len() - 1]),
    );
}

async fn phase1_sequential(service: &ReservationService, today: NaiveDate) {
    let n = 20_000;
    let window = service.guard().window_length() as u64;
    let mut book_latencies = Vec::with_capacity(n);
    let mut cancel_latencies = Vec::with_capacity(n);
    let start = Instant::now();

    for i in 0..n {
        let arrival = today + Days::new(1 + (i as u64 % window));
        let t = Instant::now();
        let booked = match service.make_reservation(request(arrival, 1)).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("  unexpected rejection: {e}");
                continue;
            }
        };
        book_latencies.push(t.elapsed());

        let t = Instant::now();
        if let Err(e) = service.cancel_reservation(booked.id).await {
            eprintln!("  cancel failed: {e}");
        }
        cancel_latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = (2 * n) as f64 / elapsed.as_secs_f64();
    println!("  {n} book+cancel pairs in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("book latency", &mut book_latencies);
    print_latency("cancel latency", &mut cancel_latencies);
}

async fn phase2_contention(service: &ReservationService, today: NaiveDate) {
    let n_tasks = 32;
    let n_per_task = 500;
    let window = service.guard().window_length() as u64;
    let admitted = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let mut handles = Vec::new();
    for task in 0..n_tasks {
        let service = service.clone();
        let admitted = admitted.clone();
        let rejected = rejected.clone();
        handles.push(tokio::spawn(async move {
            for j in 0..n_per_task {
                let offset = 1 + ((task * 7 + j) as u64 % window.saturating_sub(2).max(1));
                let arrival = today + Days::new(offset);
                match service.make_reservation(request(arrival, 3)).await {
                    Ok(r) => {
                        admitted.fetch_add(1, Ordering::Relaxed);
                        let _ = service.cancel_reservation(r.id).await;
                    }
                    Err(CampsiteError::UnavailableDates(_)) => {
                        rejected.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => eprintln!("  task {task}: {e}"),
                }
            }
        }));
    }
    for h in handles {
        let _ = h.await;
    }

    let elapsed = start.elapsed();
    let total = n_tasks * n_per_task;
    let ops = total as f64 / elapsed.as_secs_f64();
    println!(
        "  {n_tasks} tasks x {n_per_task} requests = {total} total in {:.2}s = {ops:.0} req/sec",
        elapsed.as_secs_f64()
    );
    println!(
        "  admitted={}, rejected={}",
        admitted.load(Ordering::Relaxed),
        rejected.load(Ordering::Relaxed)
    );
}

async fn phase3_read_under_load(service: &ReservationService, today: NaiveDate) {
    let stop = Arc::new(AtomicBool::new(false));
    let window = service.guard().window_length() as u64;

    let mut writer_handles = Vec::new();
    for w in 0..4u64 {
        let service = service.clone();
        let stop = stop.clone();
        writer_handles.push(tokio::spawn(async move {
            let mut i = 0u64;
            while !stop.load(Ordering::Relaxed) {
                let arrival = today + Days::new(1 + (w * 5 + i) % window);
                if let Ok(r) = service.make_reservation(request(arrival, 1)).await {
                    let _ = service.cancel_reservation(r.id).await;
                }
                i += 1;
            }
        }));
    }

    let n_readers = 16;
    let reads_per_reader = 5_000;
    let mut reader_handles = Vec::new();
    for _ in 0..n_readers {
        let service = service.clone();
        reader_handles.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(reads_per_reader);
            for _ in 0..reads_per_reader {
                let t = Instant::now();
                let _ = service.read_availability(None).await;
                latencies.push(t.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for h in reader_handles {
        if let Ok(latencies) = h.await {
            all_latencies.extend(latencies);
        }
    }

    stop.store(true, Ordering::Relaxed);
    for h in writer_handles {
        let _ = h.await;
    }

    print_latency("availability read", &mut all_latencies);
}

async fn phase4_rollover(service: &ReservationService, clock: &ManualClock) {
    let days = 365;
    let mut latencies = Vec::with_capacity(days);
    let start = Instant::now();

    for _ in 0..days {
        let tomorrow = clock.tomorrow();
        let _ = service.make_reservation(request(tomorrow, 1)).await;
        clock.advance_day();
        let t = Instant::now();
        service.guard().advance().await;
        latencies.push(t.elapsed());
    }

    println!("  {days} day rollovers in {:.2}s", start.elapsed().as_secs_f64());
    print_latency("advance latency", &mut latencies);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = CampsiteConfig::from_env();
    if let Err(e) = campsite::observability::init(config.metrics_port) {
        eprintln!("metrics exporter disabled: {e}");
    }

    let today = Local::now().date_naive();
    println!("=== campsite stress benchmark ===");
    println!("window: {} days from {today}\n", config.window_days);

    // Each phase gets a fresh calendar so earlier phases leave nothing behind.

    println!("[phase 1] sequential book/cancel throughput");
    let (_, service) = setup(&config, today);
    phase1_sequential(&service, today).await;

    println!("\n[phase 2] contended three-night bookings");
    let (_, service) = setup(&config, today);
    phase2_contention(&service, today).await;

    println!("\n[phase 3] read latency under write load");
    let (_, service) = setup(&config, today);
    phase3_read_under_load(&service, today).await;

    println!("\n[phase 4] day rollover");
    let (clock, service) = setup(&config, today);
    phase4_rollover(&service, &clock).await;

    println!("\n=== benchmark complete ===");
}
