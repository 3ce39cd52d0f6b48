use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{web, FromRequest};
use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use futures_util::{future::LocalBoxFuture, Stream, TryStreamExt};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use crate::{api::error, modules::user::schema::UserRole};

lazy_static::lazy_static! {
  static ref ARGON2: Argon2<'static> = Argon2::default();
}

pub fn hash_password(password: &str) -> Result<String, error::SystemError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = ARGON2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> Result<bool, error::SystemError> {
    let parsed_hash = PasswordHash::new(hash)?;
    match ARGON2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(error::SystemError::HashError(e)),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypeClaims {
    RefreshToken,
    AccessToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub iat: u64,
    pub exp: u64,
    pub jti: Option<uuid::Uuid>,
    pub role: UserRole,
    pub _type: Option<TypeClaims>,
}

impl Claims {
    pub fn new(sub: &uuid::Uuid, role: &UserRole, exp: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;
        Claims { sub: *sub, iat: now, exp: now + exp, role: *role, jti: None, _type: None }
    }

    pub fn with_jti(mut self, jti: uuid::Uuid) -> Self {
        self.jti = Some(jti);
        self
    }

    pub fn with_type(mut self, _type: TypeClaims) -> Self {
        self._type = Some(_type);
        self
    }

    pub fn encode(&self, secret: &[u8]) -> Result<String, error::SystemError> {
        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, self, &EncodingKey::from_secret(secret))?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &[u8]) -> Result<Self, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(token_data.claims)
    }
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedJson(model))
        })
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Query::<T>::from_request(req, payload);

        Box::pin(async move {
            let query = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            query.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedQuery(query.into_inner()))
        })
    }
}

/// A file part of a multipart request, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart body split into text fields and file parts.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

/// Buffers one multipart part, giving up as soon as it grows past `limit` bytes.
async fn read_part<S, E>(part: &mut S, name: &str, limit: usize) -> Result<Vec<u8>, error::Error>
where
    S: Stream<Item = Result<web::Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut bytes = Vec::new();
    while let Some(chunk) = part.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))? {
        if bytes.len() + chunk.len() > limit {
            return Err(error::Error::bad_request(format!(
                "'{name}' exceeds the maximum allowed size of {limit} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

impl MultipartForm {
    /// Reads every part of the body. Each part is capped at `max_part_size` bytes.
    pub async fn read(mut payload: Multipart, max_part_size: usize) -> Result<Self, error::Error> {
        let mut form = MultipartForm::default();

        while let Some(mut field) =
            payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
        {
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| error::Error::bad_request("Missing content disposition"))?;

            let name = content_disposition.get_name().unwrap_or_default().to_string();
            let filename = content_disposition.get_filename().map(|f| f.to_string());

            let declared_mime = field.content_type().map(|m| m.to_string());

            let label = filename.as_deref().unwrap_or(&name).to_string();
            let bytes = read_part(&mut field, &label, max_part_size).await?;

            match filename {
                Some(filename) => {
                    let mime_type = declared_mime
                        .filter(|m| m != "application/octet-stream")
                        .unwrap_or_else(|| {
                            mime_guess::from_path(&filename).first_or_octet_stream().to_string()
                        });
                    form.files.push(UploadedFile { filename, mime_type, bytes });
                }
                None => {
                    let value = String::from_utf8(bytes)
                        .map_err(|_| error::Error::bad_request(format!("Field '{name}' is not UTF-8")))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str, error::Error> {
        self.text(name).ok_or_else(|| error::Error::bad_request(format!("Missing field '{name}'")))
    }

    /// Parses a field holding a JSON document, e.g. an audience rule list.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, error::Error> {
        self.text(name)
            .map(|raw| {
                serde_json::from_str(raw)
                    .map_err(|e| error::Error::bad_request(format!("Invalid '{name}': {e}")))
            })
            .transpose()
    }

    pub fn take_file(&mut self) -> Option<UploadedFile> {
        if self.files.is_empty() {
            None
        } else {
            Some(self.files.remove(0))
        }
    }

    pub fn take_files(&mut self) -> Vec<UploadedFile> {
        std::mem::take(&mut self.files)
    }
}
