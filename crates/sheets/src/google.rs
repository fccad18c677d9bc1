//! Google Sheets v4 REST implementation of [`RowStore`].
//!
//! Each spreadsheet tab is a table whose first row holds the header names.
//! Requests authenticate with a bearer access token supplied by
//! configuration; obtaining and refreshing that token is left to the
//! deployment (e.g. a workload identity sidecar).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{Cells, Row, RowStore, SheetError};

/// Default Sheets API endpoint for spreadsheet resources.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Written cells are parsed as if typed into the sheet, so amounts and dates
/// land as numbers and dates rather than text.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Connection settings for [`GoogleSheetsClient`].
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    /// Spreadsheet id from the sheet URL.
    pub spreadsheet_id: String,
    /// OAuth 2.0 access token with the `spreadsheets` scope.
    pub access_token: String,
    /// API base; overridden in tests to point at a local server.
    pub api_base: String,
}

impl GoogleSheetsConfig {
    /// Settings for the public Sheets API.
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// [`RowStore`] over one Google spreadsheet.
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    http: Client,
    spreadsheet: Url,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetInfo {
    #[serde(default)]
    sheets: Vec<SheetInfo>,
}

#[derive(Debug, Deserialize)]
struct SheetInfo {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

impl GoogleSheetsClient {
    /// Creates a client. Fails only if `api_base` is not a usable URL.
    pub fn new(config: GoogleSheetsConfig) -> Result<Self, SheetError> {
        Self::with_client(Client::new(), config)
    }

    /// Creates a client that shares an existing HTTP connection pool.
    pub fn with_client(http: Client, config: GoogleSheetsConfig) -> Result<Self, SheetError> {
        let mut spreadsheet = Url::parse(&config.api_base).map_err(|e| SheetError::Malformed {
            message: format!("invalid Sheets API base '{}': {e}", config.api_base),
        })?;
        spreadsheet
            .path_segments_mut()
            .map_err(|_| SheetError::Malformed {
                message: format!("Sheets API base '{}' cannot take a path", config.api_base),
            })?
            .pop_if_empty()
            .push(&config.spreadsheet_id);

        Ok(Self {
            http,
            spreadsheet,
            access_token: config.access_token,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.spreadsheet.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Like [`Self::url`] but with a Sheets custom method (`:append`,
    /// `:batchUpdate`) attached to the last segment.
    fn method_url(&self, segments: &[&str], method: &str) -> Url {
        let mut url = self.url(segments);
        let path = format!("{}:{method}", url.path());
        url.set_path(&path);
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        table: &str,
    ) -> Result<T, SheetError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response.text().await.unwrap_or_default();
        // The API reports a missing tab as an unparsable range.
        if status.as_u16() == 400 && message.contains("Unable to parse range") {
            return Err(SheetError::TableNotFound {
                table: table.to_string(),
            });
        }
        Err(SheetError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn sheet_titles(&self) -> Result<Vec<String>, SheetError> {
        let request = self
            .http
            .get(self.url(&[]))
            .query(&[("fields", "sheets.properties.title")]);
        let info: SpreadsheetInfo = self.send(request, "").await?;
        Ok(info.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn read_range(&self, table: &str, range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let request = self.http.get(self.url(&["values", range]));
        let values: ValueRange = self.send(request, table).await?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn header_row(&self, table: &str) -> Result<Vec<String>, SheetError> {
        let rows = self.read_range(table, &header_range(table)).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn write_range(&self, table: &str, range: &str, row: Vec<String>) -> Result<(), SheetError> {
        let request = self
            .http
            .put(self.url(&["values", range]))
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&json!({ "values": [row] }));
        let _: Value = self.send(request, table).await?;
        Ok(())
    }
}

#[async_trait]
impl RowStore for GoogleSheetsClient {
    #[instrument(skip(self, headers))]
    async fn ensure_table(&self, table: &str, headers: &[&str]) -> Result<(), SheetError> {
        let titles = self.sheet_titles().await?;
        if !titles.iter().any(|t| t == table) {
            debug!(table, "creating spreadsheet tab");
            let request = self
                .http
                .post(self.method_url(&[], "batchUpdate"))
                .json(&json!({
                    "requests": [{ "addSheet": { "properties": { "title": table } } }]
                }));
            let _: Value = self.send(request, table).await?;
        }

        let mut current = self.header_row(table).await?;
        let missing: Vec<String> = headers
            .iter()
            .filter(|h| !current.iter().any(|c| c == *h))
            .map(|h| (*h).to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        debug!(table, ?missing, "adding header columns");
        current.extend(missing);
        let range = row_range(table, 1, current.len());
        self.write_range(table, &range, current).await
    }

    #[instrument(skip(self))]
    async fn get_rows(&self, table: &str) -> Result<Vec<Row>, SheetError> {
        let mut values = self.read_range(table, &quote_table(table)).await?.into_iter();
        let Some(headers) = values.next() else {
            return Ok(Vec::new());
        };

        Ok(values
            .enumerate()
            .map(|(i, raw)| {
                let cells = headers
                    .iter()
                    .zip(raw.into_iter().chain(std::iter::repeat(String::new())))
                    .filter(|(h, _)| !h.is_empty())
                    .map(|(h, v)| (h.clone(), v))
                    .collect();
                Row::new(i + 2, cells)
            })
            .collect())
    }

    #[instrument(skip(self, cells))]
    async fn add_row(&self, table: &str, cells: &Cells) -> Result<(), SheetError> {
        let headers = self.header_row(table).await?;
        let row = ordered_values(&headers, cells);
        let request = self
            .http
            .post(self.method_url(&["values", &quote_table(table)], "append"))
            .query(&[
                ("valueInputOption", VALUE_INPUT_OPTION),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }));
        let _: Value = self.send(request, table).await?;
        Ok(())
    }

    #[instrument(skip(self, row), fields(row = row.number))]
    async fn save_row(&self, table: &str, row: &Row) -> Result<(), SheetError> {
        let headers = self.header_row(table).await?;
        let values = ordered_values(&headers, row.cells());
        let range = row_range(table, row.number, headers.len());
        self.write_range(table, &range, values).await
    }
}

// ---------------------------------------------------------------------------
// A1 notation helpers
// ---------------------------------------------------------------------------

/// `'Table'` with embedded quotes doubled.
fn quote_table(table: &str) -> String {
    format!("'{}'", table.replace('\'', "''"))
}

fn header_range(table: &str) -> String {
    format!("{}!1:1", quote_table(table))
}

/// `'Table'!A{n}:{last}{n}` covering `width` columns of row `number`.
fn row_range(table: &str, number: usize, width: usize) -> String {
    let last = column_letter(width.max(1));
    format!("{}!A{number}:{last}{number}", quote_table(table))
}

/// 1-based column index to letters: 1 → `A`, 27 → `AA`.
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn ordered_values(headers: &[String], cells: &Cells) -> Vec<String> {
    headers
        .iter()
        .map(|h| cells.get(h).cloned().unwrap_or_default())
        .collect()
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    use super::*;

    const TOKEN: &str = "ya29.test";

    /// In-memory stand-in for one spreadsheet behind the Sheets v4 API.
    #[derive(Clone, Default)]
    struct FakeSheet {
        tabs: Arc<Mutex<BTreeMap<String, Vec<Vec<String>>>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeSheet {
        fn with_tab(self, title: &str, rows: &[&[&str]]) -> Self {
            let rows = rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect();
            self.tabs.lock().unwrap().insert(title.to_string(), rows);
            self
        }

        fn tab(&self, title: &str) -> Vec<Vec<String>> {
            self.tabs.lock().unwrap().get(title).cloned().unwrap_or_default()
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn reply(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
        (status, Json(body))
    }

    async fn sheets_api(
        State(sheet): State<FakeSheet>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, Json<Value>) {
        let bearer = format!("Bearer {TOKEN}");
        if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(bearer.as_str()) {
            return reply(StatusCode::UNAUTHORIZED, json!({ "error": { "code": 401 } }));
        }

        let path = uri.path().strip_prefix("/sheet1").unwrap_or_default().to_string();
        sheet.requests.lock().unwrap().push(format!(
            "{method} {path}?{}",
            uri.query().unwrap_or_default()
        ));
        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let written: Vec<String> = body["values"][0]
            .as_array()
            .map(|row| row.iter().map(|v| cell_text(v.clone())).collect())
            .unwrap_or_default();

        let mut tabs = sheet.tabs.lock().unwrap();
        if path.is_empty() {
            let sheets: Vec<Value> = tabs
                .keys()
                .map(|title| json!({ "properties": { "title": title } }))
                .collect();
            return reply(StatusCode::OK, json!({ "sheets": sheets }));
        }
        if path == ":batchUpdate" {
            let title = body
                .pointer("/requests/0/addSheet/properties/title")
                .and_then(Value::as_str)
                .unwrap_or_default();
            tabs.insert(title.to_string(), Vec::new());
            return reply(StatusCode::OK, json!({ "replies": [{}] }));
        }

        let Some(range) = path.strip_prefix("/values/") else {
            return reply(StatusCode::NOT_FOUND, json!({}));
        };
        let (range, append) = match range.strip_suffix(":append") {
            Some(range) => (range, true),
            None => (range, false),
        };
        let (table, cells) = match range.split_once('!') {
            Some((table, cells)) => (table, Some(cells)),
            None => (range, None),
        };
        let Some(rows) = tabs.get_mut(table.trim_matches('\'')) else {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({ "error": {
                    "code": 400,
                    "message": format!("Unable to parse range: {range}"),
                    "status": "INVALID_ARGUMENT"
                } }),
            );
        };

        match (method.as_str(), append, cells) {
            ("POST", true, _) => rows.push(written),
            ("GET", false, read) => {
                let values: Vec<Vec<String>> = match read {
                    Some("1:1") => rows.iter().take(1).cloned().collect(),
                    _ => rows.clone(),
                };
                // The API leaves out `values` for an empty range.
                if values.is_empty() {
                    return reply(StatusCode::OK, json!({ "range": range }));
                }
                return reply(StatusCode::OK, json!({ "range": range, "values": values }));
            }
            ("PUT", false, Some(cells)) => {
                // A{n}:{last}{n}
                let number: usize = cells[1..]
                    .split(':')
                    .next()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(1);
                if rows.len() < number {
                    rows.resize(number, Vec::new());
                }
                rows[number - 1] = written;
            }
            _ => return reply(StatusCode::NOT_FOUND, json!({})),
        }
        reply(StatusCode::OK, json!({}))
    }

    async fn serve(sheet: FakeSheet) -> String {
        let app = Router::new().fallback(sheets_api).with_state(sheet);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    async fn client_for(sheet: &FakeSheet, token: &str) -> GoogleSheetsClient {
        let api_base = serve(sheet.clone()).await;
        GoogleSheetsClient::new(GoogleSheetsConfig {
            spreadsheet_id: "sheet1".into(),
            access_token: token.into(),
            api_base,
        })
        .unwrap()
    }

    fn cells(pairs: &[(&str, &str)]) -> Cells {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn ensure_table_creates_missing_tab_with_headers() {
        let sheet = FakeSheet::default();
        let client = client_for(&sheet, TOKEN).await;

        client
            .ensure_table("Orders", &["Order ID", "Email"])
            .await
            .unwrap();

        assert_eq!(sheet.tab("Orders"), vec![vec!["Order ID", "Email"]]);
        let requests = sheet.requests();
        assert!(requests.iter().any(|r| r == "POST :batchUpdate?"));
        assert!(requests
            .iter()
            .any(|r| r == "PUT /values/'Orders'!A1:B1?valueInputOption=USER_ENTERED"));
    }

    #[tokio::test]
    async fn ensure_table_appends_missing_headers_in_place() {
        let sheet = FakeSheet::default().with_tab(
            "Orders",
            &[&["Order ID", "Status"], &["ord-1", "Paid"]],
        );
        let client = client_for(&sheet, TOKEN).await;

        client
            .ensure_table("Orders", &["Order ID", "Email", "Status"])
            .await
            .unwrap();

        assert_eq!(
            sheet.tab("Orders"),
            vec![vec!["Order ID", "Status", "Email"], vec!["ord-1", "Paid"]]
        );
        assert!(!sheet.requests().iter().any(|r| r.contains("batchUpdate")));

        let writes_before = sheet.requests().iter().filter(|r| r.starts_with("PUT")).count();
        client
            .ensure_table("Orders", &["Order ID", "Email"])
            .await
            .unwrap();
        let writes_after = sheet.requests().iter().filter(|r| r.starts_with("PUT")).count();
        assert_eq!(writes_before, writes_after);
    }

    #[tokio::test]
    async fn short_rows_are_padded_and_numbered_from_two() {
        let sheet = FakeSheet::default().with_tab(
            "Orders",
            &[
                &["Order ID", "Email", "Status"],
                &["ord-1"],
                &["ord-2", "b@example.com", "Shipped"],
            ],
        );
        let client = client_for(&sheet, TOKEN).await;

        let rows = client.get_rows("Orders").await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 2);
        assert_eq!(rows[0].get("Order ID"), "ord-1");
        assert_eq!(rows[0].cells().get("Status").map(String::as_str), Some(""));
        assert_eq!(rows[1].number, 3);
        assert_eq!(rows[1].get("Status"), "Shipped");
    }

    #[tokio::test]
    async fn empty_tab_has_no_rows() {
        let sheet = FakeSheet::default().with_tab("Orders", &[]);
        let client = client_for(&sheet, TOKEN).await;

        assert!(client.get_rows("Orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appended_rows_follow_header_order() {
        let sheet = FakeSheet::default().with_tab("Orders", &[&["Order ID", "Email", "Status"]]);
        let client = client_for(&sheet, TOKEN).await;

        client
            .add_row(
                "Orders",
                &cells(&[("Status", "New"), ("Order ID", "ord-9"), ("Unknown", "x")]),
            )
            .await
            .unwrap();

        assert_eq!(sheet.tab("Orders")[1], vec!["ord-9", "", "New"]);
        assert!(sheet.requests().iter().any(|r| r
            == "POST /values/'Orders':append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS"));
    }

    #[tokio::test]
    async fn saved_rows_overwrite_their_position() {
        let sheet = FakeSheet::default().with_tab(
            "Orders",
            &[
                &["Order ID", "Status"],
                &["ord-1", "Paid"],
                &["ord-2", "Paid"],
            ],
        );
        let client = client_for(&sheet, TOKEN).await;

        let mut row = client.get_rows("Orders").await.unwrap().remove(1);
        row.set("Status", "Shipped");
        client.save_row("Orders", &row).await.unwrap();

        assert_eq!(
            sheet.tab("Orders"),
            vec![
                vec!["Order ID", "Status"],
                vec!["ord-1", "Paid"],
                vec!["ord-2", "Shipped"],
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tab_is_table_not_found() {
        let sheet = FakeSheet::default();
        let client = client_for(&sheet, TOKEN).await;

        let err = client.get_rows("Missing").await.unwrap_err();
        assert!(matches!(err, SheetError::TableNotFound { ref table } if table == "Missing"));
    }

    #[tokio::test]
    async fn rejected_token_is_an_api_error() {
        let sheet = FakeSheet::default().with_tab("Orders", &[&["Order ID"]]);
        let client = client_for(&sheet, "expired").await;

        let err = client.get_rows("Orders").await.unwrap_err();
        assert!(matches!(err, SheetError::Api { status: 401, .. }));
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(13), "M");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn ranges_quote_table_names() {
        assert_eq!(header_range("Orders"), "'Orders'!1:1");
        assert_eq!(row_range("Bob's Orders", 4, 13), "'Bob''s Orders'!A4:M4");
    }

    #[test]
    fn values_follow_header_order() {
        let headers = vec!["B".to_string(), "A".to_string(), "C".to_string()];
        let cells: Cells = [("A", "1"), ("B", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(ordered_values(&headers, &cells), vec!["2", "1", ""]);
    }

    #[test]
    fn urls_are_built_under_the_spreadsheet() {
        let client = GoogleSheetsClient::new(GoogleSheetsConfig {
            spreadsheet_id: "sheet123".into(),
            access_token: "token".into(),
            api_base: "https://example.test/v4/spreadsheets/".into(),
        })
        .unwrap();
        assert_eq!(
            client.url(&["values", "'My Orders'!1:1"]).as_str(),
            "https://example.test/v4/spreadsheets/sheet123/values/'My%20Orders'!1:1"
        );
        assert_eq!(
            client.method_url(&[], "batchUpdate").as_str(),
            "https://example.test/v4/spreadsheets/sheet123:batchUpdate"
        );
    }

    #[test]
    fn numeric_cells_become_text() {
        assert_eq!(cell_text(json!(12.5)), "12.5");
        assert_eq!(cell_text(json!(null)), "");
        assert_eq!(cell_text(json!("x")), "x");
    }
}
