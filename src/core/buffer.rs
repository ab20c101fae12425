//! Local write buffer: attendance and incident writes that could not reach
//! the server, persisted as one JSON document under a fixed storage key.
//!
//! Every mutation loads the document, changes it and re-writes it whole, so
//! the last full serialization wins. The buffer never holds a record with
//! `synced = true`: confirmed records are removed, not flagged.

use crate::db::storage::LocalStorage;
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus, MarkMethod};
use crate::models::incident::{Incident, IncidentRecord};
use crate::utils::time::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key of the offline document.
pub const OFFLINE_KEY: &str = "exam_offline_data";

/// Snapshot of the whole buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineData {
    #[serde(default)]
    pub attendance: BTreeMap<String, Vec<AttendanceEntry>>,
    #[serde(default)]
    pub incidents: Vec<IncidentRecord>,
}

impl OfflineData {
    pub fn is_empty(&self) -> bool {
        self.attendance.values().all(Vec::is_empty) && self.incidents.is_empty()
    }

    /// Attendance records, insertion order within each exam.
    pub fn attendance_records(&self) -> Vec<AttendanceRecord> {
        self.attendance
            .iter()
            .flat_map(|(exam_id, entries)| {
                entries
                    .iter()
                    .map(move |e| AttendanceRecord::from_entry(exam_id, e))
            })
            .collect()
    }

    pub fn attendance_for(&self, exam_id: &str) -> &[AttendanceEntry] {
        self.attendance
            .get(exam_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn incidents_for<'a>(&'a self, exam_id: &'a str) -> impl Iterator<Item = &'a IncidentRecord> {
        self.incidents.iter().filter(move |i| i.exam_id == exam_id)
    }

    pub fn attendance_count(&self) -> usize {
        self.attendance.values().map(Vec::len).sum()
    }

    pub fn total_count(&self) -> usize {
        self.attendance_count() + self.incidents.len()
    }

    fn has_unsynced(&self) -> bool {
        self.attendance.values().flatten().any(|e| !e.synced)
            || self.incidents.iter().any(|i| !i.synced)
    }
}

/// Records a reconciliation pass got confirmed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmedRecords {
    pub attendance: Vec<AttendanceRecord>,
    pub incidents: Vec<IncidentRecord>,
}

impl ConfirmedRecords {
    pub fn is_empty(&self) -> bool {
        self.attendance.is_empty() && self.incidents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attendance.len() + self.incidents.len()
    }
}

/// Operations the submission façade and the reconciliation driver need from
/// the buffer. One instance per session, passed explicitly.
pub trait WriteBuffer {
    /// Create or overwrite the record for `(exam_id, student_id)`.
    fn save(
        &mut self,
        exam_id: &str,
        student_id: &str,
        status: AttendanceStatus,
        method: MarkMethod,
    ) -> AppResult<()>;

    /// Append an incident. No identity key: duplicates are kept.
    fn save_incident(&mut self, exam_id: &str, incident: &Incident) -> AppResult<()>;

    fn has_unsynced_data(&self) -> AppResult<bool>;

    fn get_offline_data(&self) -> AppResult<OfflineData>;

    /// Drop the whole persisted buffer.
    fn clear_synced_data(&mut self) -> AppResult<()>;

    /// Drop exactly the confirmed records. A record rewritten after the
    /// confirming snapshot was taken no longer matches and is kept.
    fn remove_confirmed(&mut self, confirmed: &ConfirmedRecords) -> AppResult<usize>;

    /// Forget the pending record for `(exam_id, student_id)`, if any.
    /// Returns whether one was there.
    fn discard(&mut self, exam_id: &str, student_id: &str) -> AppResult<bool>;
}

pub struct LocalWriteBuffer<S: LocalStorage> {
    storage: S,
}

impl<S: LocalStorage> LocalWriteBuffer<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn load(&self) -> AppResult<OfflineData> {
        match self.storage.get_item(OFFLINE_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(OfflineData::default()),
        }
    }

    fn persist(&mut self, data: &OfflineData) -> AppResult<()> {
        if data.is_empty() {
            return self.storage.remove_item(OFFLINE_KEY);
        }
        let raw = serde_json::to_string(data)?;
        self.storage.set_item(OFFLINE_KEY, &raw)
    }
}

impl<S: LocalStorage> WriteBuffer for LocalWriteBuffer<S> {
    fn save(
        &mut self,
        exam_id: &str,
        student_id: &str,
        status: AttendanceStatus,
        method: MarkMethod,
    ) -> AppResult<()> {
        let mut data = self.load()?;

        let record = AttendanceEntry {
            student_id: student_id.to_string(),
            status,
            method,
            captured_at_millis: now_millis(),
            synced: false,
        };

        let entries = data.attendance.entry(exam_id.to_string()).or_default();
        match entries.iter_mut().find(|e| e.student_id == student_id) {
            Some(existing) => *existing = record,
            None => entries.push(record),
        }

        self.persist(&data)
    }

    fn save_incident(&mut self, exam_id: &str, incident: &Incident) -> AppResult<()> {
        let mut data = self.load()?;
        data.incidents
            .push(IncidentRecord::new(exam_id, incident, now_millis()));
        self.persist(&data)
    }

    fn has_unsynced_data(&self) -> AppResult<bool> {
        Ok(self.load()?.has_unsynced())
    }

    fn get_offline_data(&self) -> AppResult<OfflineData> {
        self.load()
    }

    fn clear_synced_data(&mut self) -> AppResult<()> {
        self.storage.remove_item(OFFLINE_KEY)
    }

    fn discard(&mut self, exam_id: &str, student_id: &str) -> AppResult<bool> {
        let mut data = self.load()?;
        let Some(entries) = data.attendance.get_mut(exam_id) else {
            return Ok(false);
        };

        let before = entries.len();
        entries.retain(|e| e.student_id != student_id);
        if entries.len() == before {
            return Ok(false);
        }
        if entries.is_empty() {
            data.attendance.remove(exam_id);
        }

        self.persist(&data)?;
        Ok(true)
    }

    fn remove_confirmed(&mut self, confirmed: &ConfirmedRecords) -> AppResult<usize> {
        if confirmed.is_empty() {
            return Ok(0);
        }

        let mut data = self.load()?;
        let mut removed = 0;

        for rec in &confirmed.attendance {
            if let Some(entries) = data.attendance.get_mut(&rec.exam_id)
                && let Some(pos) = entries.iter().position(|e| rec.matches(e))
            {
                entries.remove(pos);
                removed += 1;
            }
        }
        data.attendance.retain(|_, entries| !entries.is_empty());

        for rec in &confirmed.incidents {
            let same = |i: &IncidentRecord| {
                i.exam_id == rec.exam_id
                    && i.student_id == rec.student_id
                    && i.category == rec.category
                    && i.severity == rec.severity
                    && i.description == rec.description
                    && i.captured_at_millis == rec.captured_at_millis
            };
            if let Some(pos) = data.incidents.iter().position(same) {
                data.incidents.remove(pos);
                removed += 1;
            }
        }

        self.persist(&data)?;
        Ok(removed)
    }
}
