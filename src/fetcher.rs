// 🌐 Paginated Fetcher - two-level aggregate → detail scrape
//
// An aggregate query lists the entities of one category; a detail query per
// entity returns its transactions. Pages are retried with exponential
// backoff on transient errors. Whatever still fails is recorded in the
// batch and left out; a batch never fails because of request errors.

use crate::config::FetchConfig;
use crate::error::{Error, FetchError, InvalidCategoryError, Result};
use crate::schema::columns::az;
use crate::table::Cell;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

// ============================================================================
// CATEGORY CATALOGUE
// ============================================================================

/// Every page of the reporting site: aggregate listings are single digits,
/// detail pages carry their parent in the first digit
static CATEGORIES: &[(&str, u16)] = &[
    ("Candidate", 1),
    ("PAC", 2),
    ("Political Party", 3),
    ("Organizations", 4),
    ("Independent Expenditures", 5),
    ("Ballot Measures", 6),
    ("Individual Contributors", 7),
    ("Vendors", 8),
    ("Name", 11),
    ("Candidate/Income", 20),
    ("Candidate/Expense", 21),
    ("Candidate/IEFor", 22),
    ("Candidate/IEAgainst", 23),
    ("Candidate/All Transactions", 24),
    ("PAC/Income", 30),
    ("PAC/Expense", 31),
    ("PAC/IEFor", 32),
    ("PAC/IEAgainst", 33),
    ("PAC/BMEFor", 34),
    ("PAC/BMEAgainst", 35),
    ("PAC/All Transactions", 36),
    ("Political Party/Income", 40),
    ("Political Party/Expense", 41),
    ("Political Party/All Transactions", 42),
    ("Organizations/IEFor", 50),
    ("Organizations/IEAgainst", 51),
    ("Organizations/BMEFor", 52),
    ("Organizations/BME Against", 53),
    ("Organizations/All Transactions", 54),
    ("Independent Expenditures/IEFor", 60),
    ("Independent Expenditures/IEAgainst", 61),
    ("Independent Expenditures/All Transactions", 62),
    ("Ballot Measures/Amount For", 70),
    ("Ballot Measures/Amount Against", 71),
    ("Ballot Measures/All Transactions", 72),
    ("Individuals/All Transactions", 80),
    ("Vendors/All Transactions", 90),
];

/// The closed set of detail page codes
pub const VALID_DETAIL_CODES: &[u16] = &[
    20, 21, 22, 23, 24, 30, 31, 32, 33, 34, 35, 36, 40, 41, 42, 50, 51, 52, 53, 54, 60, 61, 62,
    70, 71, 72, 80, 90,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub code: u16,
}

impl Category {
    /// Exact page name, case-insensitive
    pub fn from_name(name: &str) -> Result<Category> {
        let wanted = name.trim();
        CATEGORIES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(wanted))
            .map(|&(name, code)| Category { name, code })
            .ok_or_else(|| Error::UnknownCategory(name.to_string()))
    }

    pub fn from_code(code: u16) -> Option<Category> {
        CATEGORIES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|&(name, code)| Category { name, code })
    }

    pub fn all() -> impl Iterator<Item = Category> {
        CATEGORIES.iter().map(|&(name, code)| Category { name, code })
    }

    pub fn is_aggregate(&self) -> bool {
        is_aggregate_code(self.code)
    }

    /// Entity-type label for rows of an aggregate listing
    pub fn entity_label(&self) -> Option<&'static str> {
        match self.code {
            1 => Some("Candidates"),
            2 => Some("PACs"),
            3 => Some("Parties"),
            4 => Some("Organizations"),
            7 => Some("Individual Contributors"),
            8 => Some("Vendors"),
            _ => None,
        }
    }
}

pub fn is_aggregate_code(code: u16) -> bool {
    (1..=8).contains(&code)
}

/// Parent aggregate of a detail page (first digit minus one)
pub fn detail_parent(code: u16) -> std::result::Result<u16, InvalidCategoryError> {
    if !VALID_DETAIL_CODES.contains(&code) {
        return Err(InvalidCategoryError { code });
    }
    Ok(code / 10 - 1)
}

// ============================================================================
// TRANSPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Aggregate,
    Detail,
}

/// One page of table rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePage {
    pub rows: Vec<Value>,

    /// Server-reported total row count, when it sends one
    pub total: Option<u64>,
}

impl TablePage {
    /// `{"data": [...], "recordsTotal": n}`; a missing or null `data` is an
    /// empty page
    pub fn from_json(body: Value) -> std::result::Result<TablePage, FetchError> {
        let Value::Object(mut object) = body else {
            return Err(FetchError::Decode("response is not a JSON object".to_string()));
        };

        let rows = match object.remove("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                return Err(FetchError::Decode(format!(
                    "expected data array, found {}",
                    other
                )))
            }
        };
        let total = object.get("recordsTotal").and_then(|t| match t {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Ok(TablePage { rows, total })
    }
}

/// The seam between paging logic and the wire
#[async_trait]
pub trait TableTransport: Send + Sync {
    async fn post_table(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
        form: &BTreeMap<String, String>,
    ) -> std::result::Result<TablePage, FetchError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    aggregate_url: String,
    detail_url: String,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Client(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Client(format!("header value for '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;

        Ok(HttpTransport {
            client,
            aggregate_url: config.aggregate_url(),
            detail_url: config.detail_url(),
        })
    }
}

#[async_trait]
impl TableTransport for HttpTransport {
    async fn post_table(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
        form: &BTreeMap<String, String>,
    ) -> std::result::Result<TablePage, FetchError> {
        let url = match endpoint {
            Endpoint::Aggregate => &self.aggregate_url,
            Endpoint::Detail => &self.detail_url,
        };

        let response = self
            .client
            .post(url)
            .query(params)
            .form(form)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;
        TablePage::from_json(body)
    }
}

// ============================================================================
// RAW BATCH
// ============================================================================

/// A page or entity that stayed failed after every retry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// None for aggregate pages
    pub entity_id: Option<String>,
    pub page: u64,
    pub attempts: u32,
    pub error: String,
}

/// Rows of one fetch, in source order per query, plus whatever failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    pub category: u16,
    pub start_year: i32,
    pub end_year: i32,
    pub rows: Vec<Value>,
    #[serde(default)]
    pub failures: Vec<FetchFailure>,
}

impl RawBatch {
    pub fn new(category: u16, start_year: i32, end_year: i32) -> Self {
        RawBatch {
            category,
            start_year,
            end_year,
            rows: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Identifiers of the entities whose detail query failed
    pub fn failed_entities(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.failures
            .iter()
            .filter_map(|f| f.entity_id.as_deref())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// `EntityID` of every row, deduplicated in first-seen order
    pub fn entity_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.get(az::ENTITY_ID))
            .filter_map(|id| Cell::from_json(id).to_identifier().as_string())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }
}

// ============================================================================
// FETCHER
// ============================================================================

pub struct ApiFetcher<T: TableTransport> {
    transport: T,
    config: FetchConfig,
}

impl ApiFetcher<HttpTransport> {
    pub fn http(config: FetchConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(ApiFetcher::new(transport, config))
    }
}

impl<T: TableTransport> ApiFetcher<T> {
    pub fn new(transport: T, config: FetchConfig) -> Self {
        ApiFetcher { transport, config }
    }

    /// Fetch an aggregate listing for the year range
    pub async fn fetch_aggregate(&self, category: u16, start_year: i32, end_year: i32) -> Result<RawBatch> {
        if !is_aggregate_code(category) {
            return Err(Error::NotAggregate(category));
        }

        let mut batch = RawBatch::new(category, start_year, end_year);
        let (rows, failures) = self
            .fetch_pages(Endpoint::Aggregate, category, start_year, end_year, None)
            .await;
        batch.rows = rows;
        batch.failures = failures;

        info!(
            category,
            start_year,
            end_year,
            rows = batch.len(),
            failures = batch.failures.len(),
            "fetched aggregate"
        );
        Ok(batch)
    }

    /// Fetch the detail page of every entity, concurrently. Rows are
    /// stamped with `retrieved_id`; their order across entities is not
    /// defined.
    pub async fn fetch_detail(
        &self,
        category: u16,
        entity_ids: &[String],
        start_year: i32,
        end_year: i32,
    ) -> Result<RawBatch> {
        detail_parent(category)?;

        let results: Vec<(String, Vec<Value>, Vec<FetchFailure>)> = stream::iter(entity_ids.iter().cloned())
            .map(|id| async move {
                let (rows, failures) = self
                    .fetch_pages(Endpoint::Detail, category, start_year, end_year, Some(&id))
                    .await;
                (id, rows, failures)
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut batch = RawBatch::new(category, start_year, end_year);
        for (id, rows, mut failures) in results {
            if !failures.is_empty() {
                batch.failures.append(&mut failures);
                continue;
            }
            batch.rows.extend(rows.into_iter().map(|mut row| {
                if let Value::Object(object) = &mut row {
                    object.insert(az::RETRIEVED_ID.to_string(), Value::String(id.clone()));
                }
                row
            }));
        }

        info!(
            category,
            entities = entity_ids.len(),
            rows = batch.len(),
            failed = batch.failed_entities().len(),
            "fetched details"
        );
        Ok(batch)
    }

    /// One call per page name: aggregate pages directly, detail pages by
    /// listing the parent aggregate first
    pub async fn fetch(&self, name: &str, start_year: i32, end_year: i32) -> Result<RawBatch> {
        let category = Category::from_name(name)?;
        if category.is_aggregate() {
            return self.fetch_aggregate(category.code, start_year, end_year).await;
        }

        let parent = detail_parent(category.code)?;
        let listing = self.fetch_aggregate(parent, start_year, end_year).await?;
        let ids = listing.entity_ids();
        debug!(category = category.name, entities = ids.len(), "resolved entities");

        let mut batch = self
            .fetch_detail(category.code, &ids, start_year, end_year)
            .await?;
        let mut failures = listing.failures;
        failures.append(&mut batch.failures);
        batch.failures = failures;
        Ok(batch)
    }

    /// Page through one query. An aggregate page that stays failed is
    /// recorded and skipped; paging resumes at the next offset until
    /// `max_page_failures` pages in a row have failed. A detail query stops
    /// at its first failed page, since the entity is excluded anyway.
    async fn fetch_pages(
        &self,
        endpoint: Endpoint,
        category: u16,
        start_year: i32,
        end_year: i32,
        entity: Option<&str>,
    ) -> (Vec<Value>, Vec<FetchFailure>) {
        let mut rows = Vec::new();
        let mut failures = Vec::new();
        let mut page = 1u64;
        // Rows fetched plus rows covered by failed pages
        let mut offset = 0u64;
        let mut failed_in_a_row = 0u32;

        loop {
            let remaining = self.config.max_rows.map(|max| max.saturating_sub(offset));
            let length = remaining.map_or(self.config.page_length, |r| r.min(self.config.page_length));
            if length == 0 {
                break;
            }

            let params = self.query_params(category, start_year, end_year, page, length, entity);
            let form = self.form(offset, length);

            match self.request_with_retry(endpoint, &params, &form).await {
                Ok(table_page) => {
                    failed_in_a_row = 0;
                    let received = table_page.rows.len() as u64;
                    rows.extend(table_page.rows);
                    offset += received;

                    let exhausted = table_page.total.is_some_and(|total| offset >= total);
                    if received < length || exhausted {
                        break;
                    }
                }
                Err((err, attempts)) => {
                    warn!(category, entity = ?entity, page, attempts, %err, "giving up on page");
                    failures.push(FetchFailure {
                        entity_id: entity.map(str::to_string),
                        page,
                        attempts,
                        error: err.to_string(),
                    });
                    failed_in_a_row += 1;

                    if endpoint == Endpoint::Detail || failed_in_a_row >= self.config.max_page_failures.max(1) {
                        break;
                    }
                    offset += length;
                }
            }
            page += 1;
        }

        (rows, failures)
    }

    async fn request_with_retry(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
        form: &BTreeMap<String, String>,
    ) -> std::result::Result<TablePage, (FetchError, u32)> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.post_table(endpoint, params, form).await {
                Ok(page) => return Ok(page),
                Err(err) if err.is_transient() && attempt <= self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    debug!(attempt, ?delay, %err, "retrying request");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err((err, attempt)),
            }
        }
    }

    fn query_params(
        &self,
        category: u16,
        start_year: i32,
        end_year: i32,
        page: u64,
        length: u64,
        entity: Option<&str>,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("Page".to_string(), category.to_string()),
            ("startYear".to_string(), start_year.to_string()),
            ("endYear".to_string(), end_year.to_string()),
            ("JurisdictionId".to_string(), "0|Page".to_string()),
            ("TablePage".to_string(), page.to_string()),
            ("TableLength".to_string(), length.to_string()),
            ("ChartName".to_string(), category.to_string()),
            ("IsLessActive".to_string(), "false".to_string()),
            ("ShowOfficeHolder".to_string(), "false".to_string()),
        ];
        if let Some(id) = entity {
            params.push(("Name".to_string(), format!("1~{}", id)));
            params.push(("entityId".to_string(), id.to_string()));
        }
        params
    }

    fn form(&self, start: u64, length: u64) -> BTreeMap<String, String> {
        let mut form = self.config.form.clone();
        form.insert("start".to_string(), start.to_string());
        form.insert("length".to_string(), length.to_string());
        form
    }
}

// ============================================================================
// TESTS
// ============================================================================
