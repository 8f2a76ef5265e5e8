//! Process-local store with the same integrity rules as the PostgreSQL schema. Used by tests
//! and by `STORAGE_BACKEND=memory`; contents are lost on restart.

use super::{duplicate_name, missing_reference, still_referenced, Store};
use crate::error::AppError;
use crate::model::{
    City, CityForm, Order, OrderForm, Post, PostForm, Review, ReviewForm, TourGuide, TourGuideForm, Travel,
    TravelForm, User, UserForm,
};
use crate::service::query::{contains_ignore_case, TravelFilter};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One table: rows keyed by id, ids handed out like a sequence (never reused).
struct Rows<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T: Clone> Rows<T> {
    fn new() -> Self {
        Rows {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn by_ids(&self, ids: &[i64]) -> Vec<T> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|r| pred(r)).cloned()
    }

    fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.rows.values().any(pred)
    }

    fn replace(&mut self, id: i64, build: impl FnOnce(i64) -> T) -> Option<T> {
        let slot = self.rows.get_mut(&id)?;
        *slot = build(id);
        Some(slot.clone())
    }

    fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }
}

struct Tables {
    users: Rows<User>,
    cities: Rows<City>,
    tour_guides: Rows<TourGuide>,
    travels: Rows<Travel>,
    orders: Rows<Order>,
    reviews: Rows<Review>,
    posts: Rows<Post>,
}

impl Tables {
    fn require_city(&self, id: i64) -> Result<(), AppError> {
        self.cities.contains(id).then_some(()).ok_or_else(|| missing_reference("City"))
    }

    fn require_user(&self, id: i64) -> Result<(), AppError> {
        self.users.contains(id).then_some(()).ok_or_else(|| missing_reference("User"))
    }

    fn require_travel(&self, id: i64) -> Result<(), AppError> {
        self.travels.contains(id).then_some(()).ok_or_else(|| missing_reference("Travel"))
    }

    fn require_guide(&self, id: Option<i64>) -> Result<(), AppError> {
        match id {
            Some(id) if !self.tour_guides.contains(id) => Err(missing_reference("Tour guide")),
            _ => Ok(()),
        }
    }

    fn check_travel(&self, form: &TravelForm, own_id: Option<i64>) -> Result<(), AppError> {
        if self.travels.any(|t| t.name == form.name && Some(t.id) != own_id) {
            return Err(duplicate_name("Travel"));
        }
        self.require_city(form.city_id)?;
        self.require_guide(form.guide_id)
    }

    fn check_tour_guide(&self, form: &TourGuideForm, own_id: Option<i64>) -> Result<(), AppError> {
        if self.tour_guides.any(|g| g.name == form.name && Some(g.id) != own_id) {
            return Err(duplicate_name("Tour guide"));
        }
        self.require_city(form.city_id)
    }

    fn check_review(&self, form: &ReviewForm) -> Result<(), AppError> {
        self.require_user(form.user_id)?;
        self.require_travel(form.travel_id)
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            tables: RwLock::new(Tables {
                users: Rows::new(),
                cities: Rows::new(),
                tour_guides: Rows::new(),
                travels: Rows::new(),
                orders: Rows::new(),
                reviews: Rows::new(),
                posts: Rows::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

fn build_city(id: i64, f: &CityForm) -> City {
    City {
        id,
        name: f.name.clone(),
        description: f.description.clone(),
        image_url: f.image_url.clone(),
    }
}

fn build_tour_guide(id: i64, f: &TourGuideForm) -> TourGuide {
    TourGuide {
        id,
        name: f.name.clone(),
        experience_years: f.experience_years,
        bio: f.bio.clone(),
        contact_info: f.contact_info.clone(),
        city_id: f.city_id,
    }
}

fn build_travel(id: i64, f: &TravelForm) -> Travel {
    Travel {
        id,
        name: f.name.clone(),
        description: f.description.clone(),
        price: f.price,
        duration: f.duration.clone(),
        start_date: f.start_date,
        end_date: f.end_date,
        image_url: f.image_url.clone(),
        city_id: f.city_id,
        guide_id: f.guide_id,
    }
}

fn build_review(id: i64, f: &ReviewForm) -> Review {
    Review {
        id,
        user_id: f.user_id,
        travel_id: f.travel_id,
        rating: f.rating,
        comment: f.comment.clone(),
        created_at: f.created_at_or(Utc::now()),
    }
}

fn build_post(id: i64, f: &PostForm) -> Post {
    Post {
        id,
        title: f.title.clone(),
        text: f.text.clone(),
        author_id: f.author_id,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }

    async fn create_user(&self, form: &UserForm) -> Result<User, AppError> {
        let mut t = self.write()?;
        Ok(t.users.insert_with(|id| User {
            id,
            name: form.name.clone(),
            age: form.age,
        }))
    }

    async fn user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.get(id))
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.read()?.users.all())
    }

    async fn users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        Ok(self.read()?.users.by_ids(ids))
    }

    async fn users_by_credentials(&self, name: &str, age: i32) -> Result<Vec<User>, AppError> {
        let t = self.read()?;
        Ok(t.users
            .rows
            .values()
            .filter(|u| u.name == name && u.age == age)
            .cloned()
            .collect())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        if t.orders.any(|o| o.user_id == id) || t.reviews.any(|r| r.user_id == id) || t.posts.any(|p| p.author_id == id) {
            return Err(still_referenced("User"));
        }
        Ok(t.users.remove(id))
    }

    async fn create_city(&self, form: &CityForm) -> Result<City, AppError> {
        let mut t = self.write()?;
        if t.cities.any(|c| c.name == form.name) {
            return Err(duplicate_name("City"));
        }
        Ok(t.cities.insert_with(|id| build_city(id, form)))
    }

    async fn city(&self, id: i64) -> Result<Option<City>, AppError> {
        Ok(self.read()?.cities.get(id))
    }

    async fn cities(&self) -> Result<Vec<City>, AppError> {
        Ok(self.read()?.cities.all())
    }

    async fn cities_by_ids(&self, ids: &[i64]) -> Result<Vec<City>, AppError> {
        Ok(self.read()?.cities.by_ids(ids))
    }

    async fn city_by_name(&self, name: &str) -> Result<Option<City>, AppError> {
        Ok(self.read()?.cities.find(|c| c.name == name))
    }

    async fn search_city(&self, fragment: &str) -> Result<Option<City>, AppError> {
        Ok(self.read()?.cities.find(|c| contains_ignore_case(&c.name, fragment)))
    }

    async fn update_city(&self, id: i64, form: &CityForm) -> Result<Option<City>, AppError> {
        let mut t = self.write()?;
        if !t.cities.contains(id) {
            return Ok(None);
        }
        if t.cities.any(|c| c.name == form.name && c.id != id) {
            return Err(duplicate_name("City"));
        }
        Ok(t.cities.replace(id, |id| build_city(id, form)))
    }

    async fn delete_city(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        if t.tour_guides.any(|g| g.city_id == id) || t.travels.any(|tr| tr.city_id == id) {
            return Err(still_referenced("City"));
        }
        Ok(t.cities.remove(id))
    }

    async fn create_tour_guide(&self, form: &TourGuideForm) -> Result<TourGuide, AppError> {
        let mut t = self.write()?;
        t.check_tour_guide(form, None)?;
        Ok(t.tour_guides.insert_with(|id| build_tour_guide(id, form)))
    }

    async fn tour_guide(&self, id: i64) -> Result<Option<TourGuide>, AppError> {
        Ok(self.read()?.tour_guides.get(id))
    }

    async fn tour_guides(&self) -> Result<Vec<TourGuide>, AppError> {
        Ok(self.read()?.tour_guides.all())
    }

    async fn tour_guides_by_ids(&self, ids: &[i64]) -> Result<Vec<TourGuide>, AppError> {
        Ok(self.read()?.tour_guides.by_ids(ids))
    }

    async fn tour_guide_by_name(&self, name: &str) -> Result<Option<TourGuide>, AppError> {
        Ok(self.read()?.tour_guides.find(|g| g.name == name))
    }

    async fn update_tour_guide(&self, id: i64, form: &TourGuideForm) -> Result<Option<TourGuide>, AppError> {
        let mut t = self.write()?;
        if !t.tour_guides.contains(id) {
            return Ok(None);
        }
        t.check_tour_guide(form, Some(id))?;
        Ok(t.tour_guides.replace(id, |id| build_tour_guide(id, form)))
    }

    async fn delete_tour_guide(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        if t.travels.any(|tr| tr.guide_id == Some(id)) {
            return Err(still_referenced("Tour guide"));
        }
        Ok(t.tour_guides.remove(id))
    }

    async fn create_travel(&self, form: &TravelForm) -> Result<Travel, AppError> {
        let mut t = self.write()?;
        t.check_travel(form, None)?;
        Ok(t.travels.insert_with(|id| build_travel(id, form)))
    }

    async fn travel(&self, id: i64) -> Result<Option<Travel>, AppError> {
        Ok(self.read()?.travels.get(id))
    }

    async fn travels(&self) -> Result<Vec<Travel>, AppError> {
        Ok(self.read()?.travels.all())
    }

    async fn travels_by_ids(&self, ids: &[i64]) -> Result<Vec<Travel>, AppError> {
        Ok(self.read()?.travels.by_ids(ids))
    }

    async fn travel_by_name(&self, name: &str) -> Result<Option<Travel>, AppError> {
        Ok(self.read()?.travels.find(|tr| tr.name == name))
    }

    async fn search_travels(&self, filter: &TravelFilter) -> Result<Vec<Travel>, AppError> {
        let t = self.read()?;
        Ok(t.travels
            .rows
            .values()
            .filter(|tr| {
                t.cities
                    .rows
                    .get(&tr.city_id)
                    .is_some_and(|city| filter.matches(tr, &city.name))
            })
            .cloned()
            .collect())
    }

    async fn update_travel(&self, id: i64, form: &TravelForm) -> Result<Option<Travel>, AppError> {
        let mut t = self.write()?;
        if !t.travels.contains(id) {
            return Ok(None);
        }
        t.check_travel(form, Some(id))?;
        Ok(t.travels.replace(id, |id| build_travel(id, form)))
    }

    async fn delete_travel(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        if t.orders.any(|o| o.travel_id == id) || t.reviews.any(|r| r.travel_id == id) {
            return Err(still_referenced("Travel"));
        }
        Ok(t.travels.remove(id))
    }

    async fn create_order(&self, form: &OrderForm) -> Result<Order, AppError> {
        let mut t = self.write()?;
        t.require_user(form.user_id)?;
        t.require_travel(form.travel_id)?;
        let order_date = form.order_date_or(Utc::now());
        Ok(t.orders.insert_with(|id| Order {
            id,
            user_id: form.user_id,
            travel_id: form.travel_id,
            order_date,
            status: form.status_or_default().to_string(),
        }))
    }

    async fn order(&self, id: i64) -> Result<Option<Order>, AppError> {
        Ok(self.read()?.orders.get(id))
    }

    async fn orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.read()?.orders.all())
    }

    async fn delete_order(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.orders.remove(id))
    }

    async fn create_review(&self, form: &ReviewForm) -> Result<Review, AppError> {
        let mut t = self.write()?;
        t.check_review(form)?;
        Ok(t.reviews.insert_with(|id| build_review(id, form)))
    }

    async fn review(&self, id: i64) -> Result<Option<Review>, AppError> {
        Ok(self.read()?.reviews.get(id))
    }

    async fn reviews(&self) -> Result<Vec<Review>, AppError> {
        Ok(self.read()?.reviews.all())
    }

    async fn update_review(&self, id: i64, form: &ReviewForm) -> Result<Option<Review>, AppError> {
        let mut t = self.write()?;
        if !t.reviews.contains(id) {
            return Ok(None);
        }
        t.check_review(form)?;
        Ok(t.reviews.replace(id, |id| build_review(id, form)))
    }

    async fn delete_review(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.reviews.remove(id))
    }

    async fn create_post(&self, form: &PostForm) -> Result<Post, AppError> {
        let mut t = self.write()?;
        t.require_user(form.author_id)?;
        Ok(t.posts.insert_with(|id| build_post(id, form)))
    }

    async fn post(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.read()?.posts.get(id))
    }

    async fn posts(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.read()?.posts.all())
    }

    async fn update_post(&self, id: i64, form: &PostForm) -> Result<Option<Post>, AppError> {
        let mut t = self.write()?;
        if !t.posts.contains(id) {
            return Ok(None);
        }
        t.require_user(form.author_id)?;
        Ok(t.posts.replace(id, |id| build_post(id, form)))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.posts.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str) -> CityForm {
        CityForm {
            name: name.into(),
            description: "somewhere".into(),
            image_url: None,
        }
    }

    fn travel(name: &str, city_id: i64, guide_id: Option<i64>) -> TravelForm {
        TravelForm {
            name: name.into(),
            description: None,
            price: 100.0,
            duration: "3 days".into(),
            start_date: "2025-05-01".parse().unwrap(),
            end_date: "2025-05-04".parse().unwrap(),
            image_url: None,
            city_id,
            guide_id,
        }
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let a = store.create_city(&city("A")).await.unwrap();
        assert!(store.delete_city(a.id).await.unwrap());
        let b = store.create_city(&city("B")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn duplicate_city_name_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_city(&city("Minsk")).await.unwrap();
        let err = store.create_city(&city("Minsk")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.cities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn renaming_a_city_onto_another_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_city(&city("Minsk")).await.unwrap();
        let grodno = store.create_city(&city("Grodno")).await.unwrap();
        let err = store.update_city(grodno.id, &city("Minsk")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // Same name on the same row is fine.
        assert!(store.update_city(grodno.id, &city("Grodno")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn travel_requires_existing_city_and_guide() {
        let store = MemoryStore::new();
        let err = store.create_travel(&travel("T", 42, None)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));

        let c = store.create_city(&city("Rome")).await.unwrap();
        let err = store.create_travel(&travel("T", c.id, Some(9))).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));

        let t = store.create_travel(&travel("T", c.id, None)).await.unwrap();
        assert_eq!(t.guide_id, None);
    }

    #[tokio::test]
    async fn referenced_city_cannot_be_deleted() {
        let store = MemoryStore::new();
        let c = store.create_city(&city("Rome")).await.unwrap();
        store.create_travel(&travel("T", c.id, None)).await.unwrap();
        let err = store.delete_city(c.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn search_city_returns_lowest_id_match() {
        let store = MemoryStore::new();
        let first = store.create_city(&city("Saint Petersburg")).await.unwrap();
        store.create_city(&city("Petrozavodsk")).await.unwrap();
        let found = store.search_city("PET").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.search_city("zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_travels_joins_city_names() {
        let store = MemoryStore::new();
        let rome = store.create_city(&city("Rome")).await.unwrap();
        let oslo = store.create_city(&city("Oslo")).await.unwrap();
        store.create_travel(&travel("R", rome.id, None)).await.unwrap();
        store.create_travel(&travel("O", oslo.id, None)).await.unwrap();
        let filter = TravelFilter {
            name_city: Some("rome".into()),
            ..Default::default()
        };
        let found = store.search_travels(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "R");
        assert_eq!(store.search_travels(&TravelFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let store = MemoryStore::new();
        assert!(store.update_travel(5, &travel("x", 1, None)).await.unwrap().is_none());
        assert!(!store.delete_review(5).await.unwrap());
    }
}
