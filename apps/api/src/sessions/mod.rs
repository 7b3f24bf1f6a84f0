//! Session Store — uploads grouped by session id.
//!
//! Owned by `AppState`; nothing here is module-level. A session is created by its
//! first upload and lives until it is cleared or the process exits.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::errors::AppError;

pub mod handlers;

/// An uploaded file on disk plus its extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub path: PathBuf,
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "Resume",
            DocumentKind::JobDescription => "Job description",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub resume: Option<StoredDocument>,
    pub job_description: Option<StoredDocument>,
}

impl Session {
    /// Every file this session wrote.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.resume
            .iter()
            .chain(self.job_description.iter())
            .map(|doc| &doc.path)
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `document` under `session_id`, creating the session on demand.
    /// Returns the document it replaced, if any.
    pub async fn attach(
        &self,
        session_id: &str,
        kind: DocumentKind,
        document: StoredDocument,
    ) -> Option<StoredDocument> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(session_id.to_string()).or_default();
        let slot = match kind {
            DocumentKind::Resume => &mut session.resume,
            DocumentKind::JobDescription => &mut session.job_description,
        };
        slot.replace(document)
    }

    /// `(resume text, job description text)`; both uploads must be present.
    pub async fn documents_for_analysis(&self, session_id: &str) -> Result<(String, String), AppError> {
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(Session {
                resume: Some(resume),
                job_description: Some(jd),
            }) => Ok((resume.text.clone(), jd.text.clone())),
            _ => Err(AppError::Validation(
                "Both resume and job description must be uploaded first".to_string(),
            )),
        }
    }

    #[cfg(test)]
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Removes and returns the session so the caller can delete its files.
    pub async fn remove(&self, session_id: &str) -> Option<Session> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, text: &str) -> StoredDocument {
        StoredDocument {
            path: PathBuf::from(format!("/tmp/{name}")),
            file_name: name.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_analysis_requires_both_documents() {
        let store = SessionStore::new();
        store
            .attach("s1", DocumentKind::Resume, doc("cv.txt", "resume text"))
            .await;

        let err = store.documents_for_analysis("s1").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.documents_for_analysis("missing").await.is_err());

        store
            .attach("s1", DocumentKind::JobDescription, doc("jd.txt", "jd text"))
            .await;
        let (resume, jd) = store.documents_for_analysis("s1").await.unwrap();
        assert_eq!((resume.as_str(), jd.as_str()), ("resume text", "jd text"));
    }

    #[tokio::test]
    async fn test_attach_returns_replaced_document() {
        let store = SessionStore::new();
        assert!(store
            .attach("s1", DocumentKind::Resume, doc("v1.txt", "one"))
            .await
            .is_none());
        let replaced = store
            .attach("s1", DocumentKind::Resume, doc("v2.txt", "two"))
            .await;
        assert_eq!(replaced.unwrap().file_name, "v1.txt");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_returns_paths() {
        let store = SessionStore::new();
        store.attach("s1", DocumentKind::Resume, doc("cv.txt", "a")).await;
        store
            .attach("s1", DocumentKind::JobDescription, doc("jd.txt", "b"))
            .await;

        let removed = store.remove("s1").await.unwrap();
        let paths: Vec<&PathBuf> = removed.paths().collect();
        assert_eq!(paths.len(), 2);
        assert!(store.get("s1").await.is_none());
        assert!(store.remove("s1").await.is_none());
    }
}
