// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Mutex;

use booth_map_domain::{
    AssignmentRecord, Category, CompanyRecord, EventYear, PhoneRegion, Record, RecordKind,
    SubscriptionRecord, natural_key,
};

use crate::{
    ExistingIndex, ImportContext, ImportSession, MatchKey, RawRow, RecordStore, StoreError,
    WriteResults,
};

pub fn event_year() -> EventYear {
    EventYear::new(2026)
}

pub fn create_test_context() -> ImportContext {
    ImportContext {
        phone_region: PhoneRegion::default(),
        target_year: Some(event_year()),
    }
}

pub fn raw_row(cells: &[(&str, &str)]) -> RawRow {
    cells.iter().map(|(h, v)| (*h, *v)).collect()
}

pub fn company_row(name: &str) -> RawRow {
    raw_row(&[("Name", name), ("Email", "info@example.com")])
}

/// Index with two companies, three booths, one subscription, one assignment
/// and two categories.
pub fn create_test_index() -> ExistingIndex {
    let mut index: ExistingIndex = ExistingIndex::new();
    index.insert_company("Acme BV", 1);
    index.insert_company("Globex", 2);
    index.insert_booth("A12", event_year(), 10);
    index.insert_booth("A13", event_year(), 11);
    index.insert_booth("B01", event_year(), 12);
    index.insert_subscription("Acme BV", event_year(), 100);
    index.insert_assignment("Globex", "A13", event_year(), 200);
    index.insert_category("Food");
    index.insert_category("Tech");
    index
}

pub fn preview(kind: RecordKind, rows: Vec<RawRow>) -> ImportSession {
    ImportSession::preview(kind, rows, create_test_context(), create_test_index())
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    companies: Vec<CompanyRecord>,
    subscriptions: Vec<SubscriptionRecord>,
    assignments: Vec<AssignmentRecord>,
    booths: Vec<(String, EventYear, i64)>,
    categories: Vec<Category>,
    create_calls: usize,
    update_calls: usize,
    failing_create_calls: Vec<usize>,
    writes: Vec<String>,
    rejected_names: Vec<String>,
}

fn record_name(record: &Record) -> &str {
    match record {
        Record::Company(c) => &c.name,
        Record::Subscription(s) => &s.company_name,
        Record::Assignment(a) => &a.company_name,
    }
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn company_id(&self, name: &str) -> Option<i64> {
        self.companies
            .iter()
            .find(|c| natural_key(&c.name) == natural_key(name))
            .and_then(|c| c.id)
    }

    fn is_rejected(&self, record: &Record) -> bool {
        let name: &str = record_name(record);
        self.rejected_names
            .iter()
            .any(|rejected| natural_key(rejected) == natural_key(name))
    }

    fn create(&mut self, record: Record) -> Result<i64, StoreError> {
        self.writes.push(format!("create {}", record_name(&record)));
        if self.is_rejected(&record) {
            return Err(StoreError::WriteFailed(String::from("record rejected")));
        }
        match record {
            Record::Company(mut company) => {
                if self.company_id(&company.name).is_some() {
                    return Err(StoreError::Conflict(format!(
                        "company '{}' already exists",
                        company.name
                    )));
                }
                let id: i64 = self.next_id();
                company.id = Some(id);
                self.companies.push(company);
                Ok(id)
            }
            Record::Subscription(mut subscription) => {
                let id: i64 = self.next_id();
                subscription.id = Some(id);
                self.subscriptions.push(subscription);
                Ok(id)
            }
            Record::Assignment(mut assignment) => {
                let id: i64 = self.next_id();
                assignment.id = Some(id);
                self.assignments.push(assignment);
                Ok(id)
            }
        }
    }

    fn update(&mut self, record: Record) -> Result<i64, StoreError> {
        self.writes.push(format!("update {}", record_name(&record)));
        if self.is_rejected(&record) {
            return Err(StoreError::WriteFailed(String::from("record rejected")));
        }
        let missing = || StoreError::NotFound(String::from("record does not exist"));
        match record {
            Record::Company(company) => {
                let slot: &mut CompanyRecord = self
                    .companies
                    .iter_mut()
                    .find(|c| c.id.is_some() && c.id == company.id)
                    .ok_or_else(missing)?;
                *slot = company;
                slot.id.ok_or_else(missing)
            }
            Record::Subscription(subscription) => {
                let slot: &mut SubscriptionRecord = self
                    .subscriptions
                    .iter_mut()
                    .find(|s| s.id.is_some() && s.id == subscription.id)
                    .ok_or_else(missing)?;
                *slot = subscription;
                slot.id.ok_or_else(missing)
            }
            Record::Assignment(assignment) => {
                let slot: &mut AssignmentRecord = self
                    .assignments
                    .iter_mut()
                    .find(|a| a.id.is_some() && a.id == assignment.id)
                    .ok_or_else(missing)?;
                *slot = assignment;
                slot.id.ok_or_else(missing)
            }
        }
    }
}

/// In-memory `RecordStore` with failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_company(&self, name: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id: i64 = state.next_id();
        state.companies.push(CompanyRecord {
            id: Some(id),
            name: name.to_string(),
            ..CompanyRecord::default()
        });
        id
    }

    pub fn add_booth(&self, booth: &str, year: EventYear) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id: i64 = state.next_id();
        state.booths.push((booth.to_string(), year, id));
        id
    }

    pub fn add_category(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let id: i64 = state.next_id();
        state.categories.push(Category {
            id,
            name: name.to_string(),
        });
    }

    /// Makes the n-th `create_many` call (1-based) fail as a whole.
    pub fn fail_create_call(&self, call: usize) {
        self.state.lock().unwrap().failing_create_calls.push(call);
    }

    /// Makes every write of a record for `name` fail individually.
    pub fn reject_name(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_names
            .push(name.to_string());
    }

    pub fn companies(&self) -> Vec<CompanyRecord> {
        self.state.lock().unwrap().companies.clone()
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionRecord> {
        self.state.lock().unwrap().subscriptions.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }

    /// Every record handed to the store, as `create <name>` or
    /// `update <name>`, in the order received.
    pub fn writes(&self) -> Vec<String> {
        self.state.lock().unwrap().writes.clone()
    }
}

impl RecordStore for MemoryStore {
    async fn load_index(&self, _kind: RecordKind) -> Result<ExistingIndex, StoreError> {
        let state = self.state.lock().unwrap();
        let mut index: ExistingIndex = ExistingIndex::new();
        for company in &state.companies {
            if let Some(id) = company.id {
                index.insert_company(&company.name, id);
            }
        }
        for subscription in &state.subscriptions {
            if let Some(id) = subscription.id {
                index.insert_subscription(&subscription.company_name, subscription.year, id);
            }
        }
        for assignment in &state.assignments {
            if let Some(id) = assignment.id {
                index.insert_assignment(
                    &assignment.company_name,
                    &assignment.booth,
                    assignment.year,
                    id,
                );
            }
        }
        for (booth, year, id) in &state.booths {
            index.insert_booth(booth, *year, *id);
        }
        for category in &state.categories {
            index.insert_category(&category.name);
        }
        Ok(index)
    }

    async fn find_by_key(&self, key: &MatchKey) -> Result<Option<i64>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(match key {
            MatchKey::Company { company } => state.company_id(company),
            MatchKey::Subscription { company, year } => state
                .subscriptions
                .iter()
                .find(|s| natural_key(&s.company_name) == *company && s.year == *year)
                .and_then(|s| s.id),
            MatchKey::Assignment {
                company,
                booth,
                year,
            } => state
                .assignments
                .iter()
                .find(|a| {
                    natural_key(&a.company_name) == *company
                        && natural_key(&a.booth) == *booth
                        && a.year == *year
                })
                .and_then(|a| a.id),
        })
    }

    async fn create_many(&self, records: Vec<Record>) -> Result<WriteResults, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        let call: usize = state.create_calls;
        if state.failing_create_calls.contains(&call) {
            return Err(StoreError::Unavailable(String::from("connection reset")));
        }
        Ok(records.into_iter().map(|r| state.create(r)).collect())
    }

    async fn update_many(&self, records: Vec<Record>) -> Result<WriteResults, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;
        Ok(records.into_iter().map(|r| state.update(r)).collect())
    }

    async fn list_records(
        &self,
        kind: RecordKind,
        year: Option<EventYear>,
    ) -> Result<Vec<Record>, StoreError> {
        let state = self.state.lock().unwrap();
        let in_year = |y: EventYear| year.is_none_or(|wanted| wanted == y);
        Ok(match kind {
            RecordKind::Company => state.companies.iter().cloned().map(Record::Company).collect(),
            RecordKind::Subscription => state
                .subscriptions
                .iter()
                .filter(|s| in_year(s.year))
                .cloned()
                .map(Record::Subscription)
                .collect(),
            RecordKind::Assignment => state
                .assignments
                .iter()
                .filter(|a| in_year(a.year))
                .cloned()
                .map(Record::Assignment)
                .collect(),
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.lock().unwrap().categories.clone())
    }
}
