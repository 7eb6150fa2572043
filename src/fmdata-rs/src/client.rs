use crate::envelope;
use crate::multipart::{self, ContainerUpload};
use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::{ClientError, Result};
use fmdata_core::{
    endpoints, generate_payload, ClientConfig, CredentialsType, DatabaseCredentials, FindRequest,
    HttpMethod, PortalRange, RecordField, RecordRange, ScriptParameters, SortCriteria,
};
use serde_json::{Map, Value};
use urlencoding::encode;

const HEADER_AUTHORIZATION: &str = "Authorization";
const HEADER_ACCEPT: &str = "Accept";
const HEADER_CACHE_CONTROL: &str = "Cache-Control";
const HEADER_CONTENT_TYPE: &str = "Content-Type";
const MIME_TYPE_JSON: &str = "application/json; charset=utf-8";
const DEFAULT_BASE_PATH: &str = "/fmi/data/v1";

/// FileMaker Data API session client.
///
/// Holds the credentials and the current session token. Calls that change
/// the token take `&mut self`; there is no internal locking, so share a
/// client between tasks only behind your own mutex.
pub struct Client {
    transport: Box<dyn Transport>,
    credentials: DatabaseCredentials,
    base_path: String,
    /// Empty when not logged in
    token: String,
    /// Random per-client id used in multipart boundaries
    id: String,
}

impl Client {
    pub fn new(transport: impl Transport + 'static, credentials: DatabaseCredentials) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        tracing::debug!("Client id: {}", id);
        Self {
            transport: Box::new(transport),
            credentials,
            base_path: DEFAULT_BASE_PATH.to_string(),
            token: String::new(),
            id,
        }
    }

    /// Client over HTTPS using the given configuration and optional PEM root
    /// certificate
    pub fn from_config(
        config: &ClientConfig,
        credentials: DatabaseCredentials,
        ca_cert: Option<&[u8]>,
    ) -> Result<Self> {
        let transport = ReqwestTransport::from_config(config, ca_cert)?;
        Ok(Self::new(transport, credentials).with_base_path(config.base_path.clone()))
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Current session token, empty when not logged in
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn credentials(&self) -> &DatabaseCredentials {
        &self.credentials
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Log in to a database session and keep the returned token
    pub async fn log_in(&mut self) -> Result<String> {
        if self.credentials.credentials_type() != CredentialsType::User {
            tracing::error!("OAuth login is not implemented");
            return Err(ClientError::NotImplemented("OAuth login"));
        }
        tracing::debug!("Starting a new session");

        let auth = self.credentials.authorization_header_value()?;
        let payload = self.credentials.login_payload().to_string();
        tracing::debug!("Login payload length: {}", payload.len());

        let path = self.api_path(&self.credentials.login_path());
        let request = TransportRequest::new(HttpMethod::Post, path)
            .header(HEADER_AUTHORIZATION, format!("Basic {}", auth))
            .header(HEADER_CONTENT_TYPE, MIME_TYPE_JSON)
            .body(payload);

        let (status, body) = self
            .send(request)
            .await
            .map_err(|e| log_failure("log in", e))?;
        let token = envelope::check(status, &body)
            .and_then(|envelope| {
                envelope.token().map(str::to_string).ok_or_else(|| {
                    ClientError::InvalidResponse("login response has no token".to_string())
                })
            })
            .map_err(|e| log_failure("log in", e))?;

        self.token = token;
        tracing::info!("Session opened for database {}", self.credentials.database());
        Ok(body)
    }

    /// Log out of the current session.
    ///
    /// Fails without a request when not logged in. The stored token is
    /// cleared on success.
    pub async fn log_out(&mut self) -> Result<String> {
        if self.token.is_empty() {
            return Err(log_failure("log out", ClientError::NotAuthenticated));
        }
        let request = TransportRequest::new(
            HttpMethod::Delete,
            self.api_path(&self.credentials.logout_path(&self.token)),
        )
        .header(HEADER_CONTENT_TYPE, MIME_TYPE_JSON);

        let body = self.checked(request, "log out").await?;
        self.token.clear();
        tracing::info!("Session closed for database {}", self.credentials.database());
        Ok(body)
    }

    /// List the OAuth identity providers configured on the host.
    ///
    /// This endpoint does not use the Data API envelope; the body is returned
    /// on any 200 response.
    pub async fn list_oauth_providers(&self) -> Result<String> {
        let request = TransportRequest::new(HttpMethod::Get, endpoints::OAUTH_PROVIDERS)
            .header(HEADER_ACCEPT, "*/*");
        let (status, body) = self
            .send(request)
            .await
            .map_err(|e| log_failure("list OAuth providers", e))?;
        if status != 200 {
            return Err(log_failure(
                "list OAuth providers",
                ClientError::Server {
                    status,
                    message: body,
                },
            ));
        }
        Ok(body)
    }

    pub async fn oauth_request_id(
        &self,
        _tracking_id: &str,
        _provider: &str,
        _address: &str,
        _oauth_type: u32,
    ) -> Result<String> {
        Err(log_failure(
            "get OAuth request id",
            ClientError::NotImplemented("OAuth request id"),
        ))
    }

    /// Create a record with an explicit token
    pub async fn create_record_with_token(
        &self,
        token: &str,
        database: &str,
        layout: &str,
        fields: &[RecordField],
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let path = endpoints::records(database, layout);
        let payload = generate_payload(fields, scripts);
        self.authorized(token, HttpMethod::Post, path, Some(payload), "create record")
            .await
    }

    /// Create a record using the session token
    pub async fn create_record(
        &self,
        database: &str,
        layout: &str,
        fields: &[RecordField],
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let token = self.session_token("create record")?;
        self.create_record_with_token(token, database, layout, fields, scripts)
            .await
    }

    pub async fn edit_record_with_token(
        &self,
        token: &str,
        database: &str,
        layout: &str,
        record_id: &str,
        fields: &[RecordField],
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let path = endpoints::record(database, layout, record_id);
        let payload = generate_payload(fields, scripts);
        self.authorized(token, HttpMethod::Patch, path, Some(payload), "edit record")
            .await
    }

    pub async fn edit_record(
        &self,
        database: &str,
        layout: &str,
        record_id: &str,
        fields: &[RecordField],
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let token = self.session_token("edit record")?;
        self.edit_record_with_token(token, database, layout, record_id, fields, scripts)
            .await
    }

    /// Delete a record. Scripts travel in the query string.
    pub async fn delete_record_with_token(
        &self,
        token: &str,
        database: &str,
        layout: &str,
        record_id: &str,
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let mut path = endpoints::record(database, layout, record_id);
        if let Some(scripts) = scripts {
            path.push_str(&scripts.format_parameters(HttpMethod::Delete));
        }
        self.authorized(token, HttpMethod::Delete, path, None, "delete record")
            .await
    }

    pub async fn delete_record(
        &self,
        database: &str,
        layout: &str,
        record_id: &str,
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let token = self.session_token("delete record")?;
        self.delete_record_with_token(token, database, layout, record_id, scripts)
            .await
    }

    /// Fetch a single record. Portal ranges are not supported.
    pub async fn get_record_with_token(
        &self,
        token: &str,
        database: &str,
        layout: &str,
        record_id: &str,
        portals: &[PortalRange],
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        if !portals.is_empty() {
            return Err(log_failure(
                "get record",
                ClientError::NotImplemented("portal record ranges"),
            ));
        }
        let mut path = endpoints::record(database, layout, record_id);
        if let Some(scripts) = scripts {
            path.push_str(&scripts.format_parameters(HttpMethod::Get));
        }
        self.authorized(token, HttpMethod::Get, path, None, "get record")
            .await
    }

    pub async fn get_record(
        &self,
        database: &str,
        layout: &str,
        record_id: &str,
        portals: &[PortalRange],
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let token = self.session_token("get record")?;
        self.get_record_with_token(token, database, layout, record_id, portals, scripts)
            .await
    }

    /// Fetch a range of records, optionally sorted
    pub async fn get_records_with_token(
        &self,
        token: &str,
        database: &str,
        layout: &str,
        range: RecordRange,
        sort: Option<&SortCriteria>,
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let mut query: Vec<String> = range
            .query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, encode(&value)))
            .collect();
        if let Some(sort) = sort.filter(|s| !s.is_empty()) {
            if let Some(fields) = sort.to_json().remove("sort") {
                query.push(format!("_sort={}", encode(&fields.to_string())));
            }
        }
        if let Some(scripts) = scripts {
            let script_query = scripts.format_parameters(HttpMethod::Get);
            if let Some(pairs) = script_query.strip_prefix('?') {
                query.push(pairs.to_string());
            }
        }
        let path = format!("{}?{}", endpoints::records(database, layout), query.join("&"));
        self.authorized(token, HttpMethod::Get, path, None, "get records")
            .await
    }

    pub async fn get_records(
        &self,
        database: &str,
        layout: &str,
        range: RecordRange,
        sort: Option<&SortCriteria>,
        scripts: Option<&ScriptParameters>,
    ) -> Result<String> {
        let token = self.session_token("get records")?;
        self.get_records_with_token(token, database, layout, range, sort, scripts)
            .await
    }

    /// Upload a file into a container field
    pub async fn upload_container_data_with_token(
        &self,
        token: &str,
        database: &str,
        layout: &str,
        record_id: &str,
        upload: &ContainerUpload,
    ) -> Result<String> {
        if token.is_empty() {
            return Err(log_failure("upload container data", ClientError::NotAuthenticated));
        }
        let path = endpoints::container(
            database,
            layout,
            record_id,
            &upload.field_name,
            upload.repetition,
        );
        let boundary = multipart::boundary(&self.id);
        tracing::debug!("Url: {}, boundary: {}", path, boundary);

        let request = TransportRequest::new(HttpMethod::Post, self.api_path(&path))
            .header(HEADER_AUTHORIZATION, format!("Bearer {}", token))
            .header(HEADER_ACCEPT, "*/*")
            .header(HEADER_CACHE_CONTROL, "no-cache")
            .header(HEADER_CONTENT_TYPE, multipart::content_type(&boundary))
            .body(upload.form_data(&boundary));

        self.checked(request, "upload container data").await
    }

    pub async fn upload_container_data(
        &self,
        database: &str,
        layout: &str,
        record_id: &str,
        upload: &ContainerUpload,
    ) -> Result<String> {
        let token = self.session_token("upload container data")?;
        self.upload_container_data_with_token(token, database, layout, record_id, upload)
            .await
    }

    /// Run a find request: groups are ORed, fields within a group ANDed
    pub async fn perform_find_with_token(
        &self,
        token: &str,
        database: &str,
        layout: &str,
        request: &FindRequest,
    ) -> Result<String> {
        let path = endpoints::find(database, layout);
        self.authorized(
            token,
            HttpMethod::Post,
            path,
            Some(request.to_payload()),
            "perform find",
        )
        .await
    }

    pub async fn perform_find(
        &self,
        database: &str,
        layout: &str,
        request: &FindRequest,
    ) -> Result<String> {
        let token = self.session_token("perform find")?;
        self.perform_find_with_token(token, database, layout, request)
            .await
    }

    pub async fn set_global_fields(
        &self,
        _database: &str,
        _fields: &[RecordField],
    ) -> Result<String> {
        Err(log_failure(
            "set global fields",
            ClientError::NotImplemented("global fields"),
        ))
    }

    fn session_token(&self, operation: &str) -> Result<&str> {
        if self.token.is_empty() {
            return Err(log_failure(operation, ClientError::NotAuthenticated));
        }
        Ok(&self.token)
    }

    fn api_path(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path)
    }

    /// Bearer-authenticated request. POST and PATCH always carry a JSON
    /// body (`{}` when no payload is given); GET and DELETE never do.
    async fn authorized(
        &self,
        token: &str,
        method: HttpMethod,
        path: String,
        payload: Option<Value>,
        operation: &str,
    ) -> Result<String> {
        if token.is_empty() {
            return Err(log_failure(operation, ClientError::NotAuthenticated));
        }
        let path = self.api_path(&path);
        tracing::debug!("Url: {}", path);

        let mut request = TransportRequest::new(method, path)
            .header(HEADER_AUTHORIZATION, format!("Bearer {}", token))
            .header(HEADER_ACCEPT, "*/*")
            .header(HEADER_CACHE_CONTROL, "no-cache");
        if method.has_body() {
            let payload = payload
                .unwrap_or_else(|| Value::Object(Map::new()))
                .to_string();
            tracing::debug!("Payload: {}", payload);
            request = request
                .header(HEADER_CONTENT_TYPE, MIME_TYPE_JSON)
                .body(payload);
        }

        self.checked(request, operation).await
    }

    /// Send and apply the envelope rule, returning the raw body
    async fn checked(&self, request: TransportRequest, operation: &str) -> Result<String> {
        let (status, body) = self
            .send(request)
            .await
            .map_err(|e| log_failure(operation, e))?;
        match envelope::check(status, &body) {
            Ok(_) => {
                tracing::debug!("Successful request - Status: {}", status);
                Ok(body)
            }
            Err(e) => Err(log_failure(operation, e)),
        }
    }

    async fn send(&self, request: TransportRequest) -> Result<(u16, String)> {
        let response = self.transport.send(request).await?;
        tracing::debug!("Response: {}", response.body);
        Ok((response.status, response.body))
    }
}

fn log_failure(operation: &str, error: ClientError) -> ClientError {
    tracing::error!("Failed to {}: {}", operation, error);
    error
}
