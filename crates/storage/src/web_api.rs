use endpoint_relay_domain::storage::{
    fields, Record, RecordQuery, RecordStore, StorageError, StorageResult, DEFINITION_TABLE,
    VALUE_TABLE,
};
use reqwest::{header, Client, Url};
use serde_json::Value;
use tracing::debug;

/// Entity set and column names the host uses for one logical table.
struct RemoteTable {
    entity_set: &'static str,
    fields: &'static [(&'static str, &'static str)],
}

static DEFINITIONS: RemoteTable = RemoteTable {
    entity_set: "environmentvariabledefinitions",
    fields: &[
        (fields::ID, "environmentvariabledefinitionid"),
        (fields::DISPLAY_NAME, "displayname"),
    ],
};

static VALUES: RemoteTable = RemoteTable {
    entity_set: "environmentvariablevalues",
    fields: &[
        (fields::ID, "environmentvariablevalueid"),
        (fields::DEFINITION_ID, "_environmentvariabledefinitionid_value"),
        (fields::RAW_TEXT, "value"),
    ],
};

impl RemoteTable {
    fn for_table(table: &str) -> StorageResult<&'static RemoteTable> {
        match table {
            DEFINITION_TABLE => Ok(&DEFINITIONS),
            VALUE_TABLE => Ok(&VALUES),
            other => Err(StorageError::UnknownTable(other.to_string())),
        }
    }

    fn remote_field(&self, table: &str, field: &str) -> StorageResult<&'static str> {
        self.fields
            .iter()
            .find(|(logical, _)| *logical == field)
            .map(|(_, remote)| *remote)
            .ok_or_else(|| StorageError::UnknownField {
                table: table.to_string(),
                field: field.to_string(),
            })
    }

    /// Same query in the host's vocabulary.
    fn translate(&self, query: &RecordQuery) -> StorageResult<RecordQuery> {
        let table = query.table_name();
        let mut remote = RecordQuery::table(self.entity_set);
        for filter in query.filters() {
            remote = remote.filter_eq(self.remote_field(table, filter.field())?, filter.value());
        }
        let selected = query
            .selected_fields()
            .iter()
            .map(|field| self.remote_field(table, field))
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(remote.select(selected))
    }
}

/// Record store backed by an OData-style web API:
/// `GET {base}/{entity set}?$select=..&$filter=..` answering `{"value": [...]}`.
/// Logical tables and fields are mapped onto the environment-variable
/// entities on the way out and back.
#[derive(Clone)]
pub struct WebApiRecordStore {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl WebApiRecordStore {
    pub fn new(base_url: &str, token: Option<String>) -> StorageResult<Self> {
        let base_url = Url::parse(base_url).map_err(StorageError::from_source)?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::Backend(format!(
                "record store url `{base_url}` cannot be used as a base"
            )));
        }
        let client = Client::builder()
            .build()
            .map_err(StorageError::from_source)?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Full request URL for `query`, with `$select`/`$filter` percent-encoded.
    pub fn request_url(&self, query: &RecordQuery) -> StorageResult<Url> {
        let remote = RemoteTable::for_table(query.table_name())?.translate(query)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::Backend("record store url has no path".into()))?
            .pop_if_empty()
            .push(remote.table_name());

        {
            let mut pairs = url.query_pairs_mut();
            if !remote.selected_fields().is_empty() {
                pairs.append_pair("$select", &remote.selected_fields().join(","));
            }
            if !remote.filters().is_empty() {
                pairs.append_pair("$filter", &remote.filter_expression());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }
}

#[async_trait::async_trait]
impl RecordStore for WebApiRecordStore {
    async fn query(&self, query: &RecordQuery) -> StorageResult<Vec<Record>> {
        let table = RemoteTable::for_table(query.table_name())?;
        let url = self.request_url(query)?;
        debug!(%url, table = query.table_name(), "web api record query");

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(StorageError::from_source)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Backend(format!(
                "query on `{}` returned {}",
                table.entity_set, status
            )));
        }

        let body: Value = response.json().await.map_err(StorageError::from_source)?;
        records_from_body(body, table, query)
    }
}

/// Extracts the `value` array and renames host columns back to logical
/// fields. Only selected fields are kept (every mapped field when nothing
/// was selected); nulls and non-scalars are treated as absent.
fn records_from_body(
    body: Value,
    table: &RemoteTable,
    query: &RecordQuery,
) -> StorageResult<Vec<Record>> {
    let Value::Object(mut envelope) = body else {
        return Err(StorageError::Backend(
            "record response is not a JSON object".into(),
        ));
    };
    let Some(Value::Array(rows)) = envelope.remove("value") else {
        return Err(StorageError::Backend(
            "record response has no `value` array".into(),
        ));
    };

    let wanted: Vec<(&str, &str)> = if query.selected_fields().is_empty() {
        table.fields.to_vec()
    } else {
        table
            .fields
            .iter()
            .copied()
            .filter(|(logical, _)| {
                query
                    .selected_fields()
                    .iter()
                    .any(|field| field.as_str() == *logical)
            })
            .collect()
    };

    rows.into_iter()
        .map(|row| {
            let Value::Object(mut object) = row else {
                return Err(StorageError::Backend(format!(
                    "record from `{}` is not a JSON object",
                    table.entity_set
                )));
            };
            let mut record = Record::new();
            for (logical, remote) in &wanted {
                if let Some(text) = object.remove(*remote).and_then(scalar_text) {
                    record.insert(*logical, text);
                }
            }
            Ok(record)
        })
        .collect()
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}
