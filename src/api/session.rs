//! Login session persisted next to the offline buffer: the bearer token
//! under `token` and the logged-in user under `user`.

use crate::api::http::LoginResponse;
use crate::db::storage::LocalStorage;
use crate::errors::AppResult;
use crate::models::exam::Exam;
use crate::models::student::Student;
use serde::{Deserialize, Serialize};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

pub struct Session;

impl Session {
    pub fn store(storage: &mut dyn LocalStorage, login: &LoginResponse) -> AppResult<SessionUser> {
        let user = SessionUser {
            username: login.username.clone(),
            full_name: login.full_name.clone(),
            role: login.role.clone(),
        };
        storage.set_item(TOKEN_KEY, &login.token)?;
        storage.set_item(USER_KEY, &serde_json::to_string(&user)?)?;
        Ok(user)
    }

    pub fn token(storage: &dyn LocalStorage) -> AppResult<Option<String>> {
        Ok(storage
            .get_item(TOKEN_KEY)?
            .filter(|t| !t.trim().is_empty()))
    }

    pub fn user(storage: &dyn LocalStorage) -> AppResult<Option<SessionUser>> {
        match storage.get_item(USER_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).ok()),
            None => Ok(None),
        }
    }

    pub fn clear(storage: &mut dyn LocalStorage) -> AppResult<()> {
        storage.remove_item(TOKEN_KEY)?;
        storage.remove_item(USER_KEY)?;
        Ok(())
    }
}

/// Last roster fetched for an exam, kept so scanning works offline.
pub struct RosterCache;

impl RosterCache {
    fn key(exam_id: &str) -> String {
        format!("roster:{}", exam_id)
    }

    pub fn store(storage: &mut dyn LocalStorage, exam_id: &str, roster: &[Student]) -> AppResult<()> {
        storage.set_item(&Self::key(exam_id), &serde_json::to_string(roster)?)
    }

    pub fn load(storage: &dyn LocalStorage, exam_id: &str) -> AppResult<Option<Vec<Student>>> {
        match storage.get_item(&Self::key(exam_id))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

/// Assigned exams as last listed, so the timer works without the server.
pub struct ExamCache;

impl ExamCache {
    const KEY: &'static str = "exams";

    pub fn store(storage: &mut dyn LocalStorage, exams: &[Exam]) -> AppResult<()> {
        storage.set_item(Self::KEY, &serde_json::to_string(exams)?)
    }

    pub fn find(storage: &dyn LocalStorage, exam_id: &str) -> AppResult<Option<Exam>> {
        let Some(raw) = storage.get_item(Self::KEY)? else {
            return Ok(None);
        };
        let exams: Vec<Exam> = serde_json::from_str(&raw)?;
        Ok(exams.into_iter().find(|e| e.id.to_string() == exam_id.trim()))
    }
}
