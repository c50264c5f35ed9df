//! HTTP implementation of the storage authority.
//!
//! Thin JSON client over the backend service. Every request carries the
//! configured deadline, so calls settle instead of hanging the gate. Failure
//! bodies are decoded into the typed [`GaritaError`] taxonomy when the
//! backend speaks it; anything else is reported as `Transport` with a
//! sanitized excerpt (cedulas are redacted before the text can reach logs).

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::{
    ActualizacionBloqueo, Backend, CierreRegistro, NuevaAlerta, NuevoBloqueo, NuevoRegistro,
    ResolucionAlerta,
};
use crate::config::BackendConfig;
use crate::error::GaritaError;
use crate::types::{
    BadgeAlert, BadgeToken, BlacklistEntry, CambioBloqueo, CambioGafete, EntryRecord, TipoPersona,
};

/// Client for the remote backend authority.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, GaritaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(GaritaError::transport)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map non-success responses into the taxonomy.
    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GaritaError> {
        let response = self
            .with_auth(builder)
            .send()
            .await
            .map_err(map_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(parse_failure(status, &body))
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, GaritaError> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        decode(response).await
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, GaritaError> {
        let response = self
            .execute(self.client.post(self.url(path)).json(body))
            .await?;
        decode(response).await
    }

    async fn patch_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, GaritaError> {
        let response = self
            .execute(self.client.patch(self.url(path)).json(body))
            .await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), GaritaError> {
        self.execute(self.client.delete(self.url(path))).await?;
        Ok(())
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, GaritaError> {
    response
        .json::<R>()
        .await
        .map_err(|e| GaritaError::transport(format!("respuesta ilegible del backend: {e}")))
}

fn map_transport(e: reqwest::Error) -> GaritaError {
    if e.is_timeout() {
        return GaritaError::transport("tiempo de espera agotado contra el backend");
    }
    GaritaError::transport(e)
}

/// Decode a non-success body: a typed failure when the backend speaks the
/// taxonomy, `Transport` with a sanitized excerpt otherwise.
fn parse_failure(status: StatusCode, body: &str) -> GaritaError {
    if let Ok(err) = serde_json::from_str::<GaritaError>(body) {
        return err;
    }
    GaritaError::transport(format!(
        "estado {status} del backend: {}",
        sanitize_error_body(body)
    ))
}

fn sanitize_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [r"\b\d{1,3}-\d{2,6}-\d{2,6}\b", r"\b\d{6,12}\b"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[CEDULA]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

#[async_trait]
impl Backend for HttpBackend {
    async fn insert_badge(&self, gafete: BadgeToken) -> Result<BadgeToken, GaritaError> {
        self.post_json("/gafetes", &gafete).await
    }

    async fn get_badge(
        &self,
        numero: &str,
        tipo: TipoPersona,
    ) -> Result<BadgeToken, GaritaError> {
        self.get_json(&format!("/gafetes/{tipo}/{numero}")).await
    }

    async fn list_badges(&self) -> Result<Vec<BadgeToken>, GaritaError> {
        self.get_json("/gafetes").await
    }

    async fn transition_badge(
        &self,
        numero: &str,
        tipo: TipoPersona,
        cambio: CambioGafete,
    ) -> Result<BadgeToken, GaritaError> {
        self.post_json(&format!("/gafetes/{tipo}/{numero}/transicion"), &cambio)
            .await
    }

    async fn delete_badge(&self, numero: &str, tipo: TipoPersona) -> Result<(), GaritaError> {
        self.delete(&format!("/gafetes/{tipo}/{numero}")).await
    }

    async fn insert_entry(&self, nuevo: NuevoRegistro) -> Result<EntryRecord, GaritaError> {
        self.post_json("/registros", &nuevo).await
    }

    async fn get_entry(&self, id: &str) -> Result<EntryRecord, GaritaError> {
        self.get_json(&format!("/registros/{id}")).await
    }

    async fn list_entries(&self) -> Result<Vec<EntryRecord>, GaritaError> {
        self.get_json("/registros").await
    }

    async fn close_entry(
        &self,
        id: &str,
        cierre: CierreRegistro,
    ) -> Result<EntryRecord, GaritaError> {
        self.post_json(&format!("/registros/{id}/cierre"), &cierre)
            .await
    }

    async fn insert_block(&self, nuevo: NuevoBloqueo) -> Result<BlacklistEntry, GaritaError> {
        self.post_json("/lista-negra", &nuevo).await
    }

    async fn get_block(&self, id: &str) -> Result<BlacklistEntry, GaritaError> {
        self.get_json(&format!("/lista-negra/{id}")).await
    }

    async fn list_blocks(&self) -> Result<Vec<BlacklistEntry>, GaritaError> {
        self.get_json("/lista-negra").await
    }

    async fn append_block_change(
        &self,
        id: &str,
        cambio: CambioBloqueo,
        observaciones: Option<String>,
    ) -> Result<BlacklistEntry, GaritaError> {
        #[derive(Serialize)]
        struct Payload {
            cambio: CambioBloqueo,
            observaciones: Option<String>,
        }
        self.post_json(
            &format!("/lista-negra/{id}/cambios"),
            &Payload {
                cambio,
                observaciones,
            },
        )
        .await
    }

    async fn update_block(
        &self,
        id: &str,
        cambios: ActualizacionBloqueo,
    ) -> Result<BlacklistEntry, GaritaError> {
        self.patch_json(&format!("/lista-negra/{id}"), &cambios).await
    }

    async fn insert_alert(&self, nueva: NuevaAlerta) -> Result<BadgeAlert, GaritaError> {
        self.post_json("/alertas", &nueva).await
    }

    async fn get_alert(&self, id: &str) -> Result<BadgeAlert, GaritaError> {
        self.get_json(&format!("/alertas/{id}")).await
    }

    async fn list_alerts(&self) -> Result<Vec<BadgeAlert>, GaritaError> {
        self.get_json("/alertas").await
    }

    async fn resolve_alert(
        &self,
        id: &str,
        resolucion: ResolucionAlerta,
    ) -> Result<BadgeAlert, GaritaError> {
        self.post_json(&format!("/alertas/{id}/resolucion"), &resolucion)
            .await
    }
}
