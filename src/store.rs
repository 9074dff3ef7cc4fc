use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ulid::Ulid;

use crate::model::Reservation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(Ulid),
    AlreadyExists(Ulid),
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "reservation not stored: {id}"),
            StoreError::AlreadyExists(id) => write!(f, "reservation already stored: {id}"),
            StoreError::Unavailable(e) => write!(f, "store unavailable: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable home of reservation records. The availability guard calls it from
/// inside its write critical section, so implementations must not call back
/// into the guard.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn create(&self, reservation: &Reservation) -> Result<(), StoreError>;

    async fn update(&self, reservation: &Reservation) -> Result<(), StoreError>;

    async fn delete(&self, id: Ulid) -> Result<(), StoreError>;

    async fn get(&self, id: Ulid) -> Result<Option<Reservation>, StoreError>;

    async fn list(&self) -> Result<Vec<Reservation>, StoreError>;
}

/// Process-local store. Nothing survives a restart.
pub struct InMemoryStore {
    reservations: DashMap<Ulid, Reservation>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn create(&self, reservation: &Reservation) -> Result<(), StoreError> {
        match self.reservations.entry(reservation.id) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(reservation.id)),
            Entry::Vacant(slot) => {
                slot.insert(reservation.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, reservation: &Reservation) -> Result<(), StoreError> {
        let mut entry = self
            .reservations
            .get_mut(&reservation.id)
            .ok_or(StoreError::NotFound(reservation.id))?;
        *entry = reservation.clone();
        Ok(())
    }

    async fn delete(&self, id: Ulid) -> Result<(), StoreError> {
        self.reservations
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn get(&self, id: Ulid) -> Result<Option<Reservation>, StoreError> {
        Ok(self.reservations.get(&id).map(|e| e.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .reservations
            .iter()
            .map(|e| e.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reservation(day: u32) -> Reservation {
        Reservation {
            id: Ulid::new(),
            email: "camper@example.com".into(),
            full_name: "Happy Camper".into(),
            arrival: NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
            departure: NaiveDate::from_ymd_opt(2024, 8, day + 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_get_list() {
        let store = InMemoryStore::new();
        let r = reservation(3);
        store.create(&r).await.unwrap();
        assert_eq!(store.get(r.id).await.unwrap(), Some(r.clone()));
        assert_eq!(store.list().await.unwrap(), vec![r]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_create_rejected() {
        let store = InMemoryStore::new();
        let r = reservation(3);
        store.create(&r).await.unwrap();
        assert_eq!(store.create(&r).await, Err(StoreError::AlreadyExists(r.id)));
    }

    #[tokio::test]
    async fn update_replaces_record() {
        let store = InMemoryStore::new();
        let mut r = reservation(3);
        store.create(&r).await.unwrap();
        r.full_name = "Renamed Camper".into();
        store.update(&r).await.unwrap();
        assert_eq!(store.get(r.id).await.unwrap().unwrap().full_name, "Renamed Camper");
    }

    #[tokio::test]
    async fn update_and_delete_missing_fail() {
        let store = InMemoryStore::new();
        let r = reservation(3);
        assert_eq!(store.update(&r).await, Err(StoreError::NotFound(r.id)));
        assert_eq!(store.delete(r.id).await, Err(StoreError::NotFound(r.id)));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryStore::new();
        let r = reservation(3);
        store.create(&r).await.unwrap();
        store.delete(r.id).await.unwrap();
        assert!(store.get(r.id).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
