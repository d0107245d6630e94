use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use wedding_shared::error::StoreError;
use wedding_shared::models::{Choice, RsvpDraft, RsvpRecord};
use wedding_shared::store::RsvpStore;

/// Section the page scrolls to once the form has closed.
pub const SCROLL_TARGET: &str = "account-section";

/// Length of the form's closing transition.
pub const CLOSE_TRANSITION: Duration = Duration::from_millis(300);

const BIRTHDATE_DIGITS: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RsvpError {
    #[error("No RSVP form is open")]
    FormClosed,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("An RSVP for this name and birthdate already exists")]
    Duplicate,

    #[error("Search failed: {0}")]
    Search(StoreError),

    #[error("Save failed: {0}")]
    Save(StoreError),
}

impl RsvpError {
    /// Message shown to the guest.
    pub fn user_message(&self) -> &'static str {
        match self {
            RsvpError::FormClosed => "참석 정보 입력 창을 먼저 열어주세요.",
            RsvpError::MissingFields(_) => {
                "필수 항목을 모두 입력해주세요 (이름, 생년월일, 참석여부, 식사여부)"
            }
            RsvpError::Duplicate => "이미 등록된 정보가 있습니다. 이름으로 검색하여 수정해주세요.",
            RsvpError::Search(_) => "검색 중 오류가 발생했습니다.",
            RsvpError::Save(_) => "저장 중 오류가 발생했습니다.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching,
    Found,
    NoResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Closed,
    OpenNew,
    OpenExisting,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsvpStatus {
    pub search: SearchStatus,
    pub form: FormStatus,
}

impl RsvpStatus {
    /// True while a store call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.search == SearchStatus::Searching || self.form == FormStatus::Submitting
    }
}

impl Default for RsvpStatus {
    fn default() -> Self {
        Self {
            search: SearchStatus::Idle,
            form: FormStatus::Closed,
        }
    }
}

/// The record being edited. `id` is set when editing an existing RSVP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RsvpForm {
    pub id: Option<String>,
    pub draft: RsvpDraft,
}

impl RsvpForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn for_record(record: &RsvpRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            draft: record.draft(),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.draft.name = name.to_string();
    }

    /// Keeps digits only, at most six of them.
    pub fn set_birthdate(&mut self, raw: &str) {
        self.draft.birthdate = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(BIRTHDATE_DIGITS)
            .collect();
    }

    pub fn set_attendance(&mut self, choice: Choice) {
        self.draft.attendance = Some(choice);
    }

    pub fn set_meal(&mut self, choice: Choice) {
        self.draft.meal = Some(choice);
    }

    pub fn set_companion_count(&mut self, count: u32) {
        self.draft.companion_count = count;
    }

    pub fn set_message(&mut self, message: &str) {
        self.draft.message = message.to_string();
    }

    pub fn is_existing(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// A scroll that must wait for the form's closing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingScroll {
    pub section: &'static str,
    pub delay: Duration,
}

impl Default for PendingScroll {
    fn default() -> Self {
        Self {
            section: SCROLL_TARGET,
            delay: CLOSE_TRANSITION,
        }
    }
}

impl PendingScroll {
    /// Runs `scroll_to(section)` once the delay has elapsed.
    pub fn schedule<F>(self, scroll_to: F) -> JoinHandle<()>
    where
        F: FnOnce(&'static str) + Send + 'static,
    {
        tokio::spawn(async move {
            tokio::time::sleep(self.delay).await;
            scroll_to(self.section);
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub kind: SaveKind,
    pub record: RsvpRecord,
    pub scroll: PendingScroll,
}

impl SaveOutcome {
    pub fn message(&self) -> &'static str {
        match self.kind {
            SaveKind::Created => "소중한 의사 전달 감사합니다.",
            SaveKind::Updated => "수정되었습니다.",
        }
    }
}

/// Search, edit and save flow of the RSVP section.
///
/// Creation is guarded by a lookup on `(name, birthdate)` issued right before
/// the insert. Two guests submitting the same identity at the same moment can
/// both pass that lookup; nothing here prevents the second insert.
pub struct RsvpController<S: RsvpStore + ?Sized> {
    store: Arc<S>,
    query: String,
    results: Vec<RsvpRecord>,
    form: Option<RsvpForm>,
    status: watch::Sender<RsvpStatus>,
}

impl<S: RsvpStore + ?Sized> RsvpController<S> {
    pub fn new(store: Arc<S>) -> Self {
        let (status, _) = watch::channel(RsvpStatus::default());
        Self {
            store,
            query: String::new(),
            results: Vec::new(),
            form: None,
            status,
        }
    }

    pub fn status(&self) -> RsvpStatus {
        *self.status.borrow()
    }

    /// Status updates for a renderer, e.g. to show a spinner.
    pub fn subscribe(&self) -> watch::Receiver<RsvpStatus> {
        self.status.subscribe()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[RsvpRecord] {
        &self.results
    }

    pub fn form(&self) -> Option<&RsvpForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut RsvpForm> {
        self.form.as_mut()
    }

    fn set_search(&self, search: SearchStatus) {
        self.status.send_modify(|s| s.search = search);
    }

    fn set_form(&self, form: FormStatus) {
        self.status.send_modify(|s| s.form = form);
    }

    /// Looks up every RSVP with exactly this name. A blank name clears the
    /// results without touching the store.
    pub async fn search(&mut self, name: &str) -> Result<&[RsvpRecord], RsvpError> {
        self.query = name.to_string();
        let name = name.trim();

        if name.is_empty() {
            self.results.clear();
            self.set_search(SearchStatus::Idle);
            return Ok(&self.results);
        }

        let previous = self.status().search;
        self.set_search(SearchStatus::Searching);

        match self.store.find_by_name(name).await {
            Ok(found) => {
                debug!("RSVP search found {} records", found.len());
                self.results = found;
                self.set_search(if self.results.is_empty() {
                    SearchStatus::NoResults
                } else {
                    SearchStatus::Found
                });
                Ok(&self.results)
            }
            Err(e) => {
                warn!("RSVP search failed: {}", e);
                self.set_search(previous);
                Err(RsvpError::Search(e))
            }
        }
    }

    /// Opens the form, blank or seeded from an existing record.
    pub fn open_form(&mut self, existing: Option<&RsvpRecord>) {
        let form = match existing {
            Some(record) => RsvpForm::for_record(record),
            None => RsvpForm::blank(),
        };
        self.set_form(if form.is_existing() {
            FormStatus::OpenExisting
        } else {
            FormStatus::OpenNew
        });
        self.form = Some(form);
    }

    /// Offered after a search found nothing: a new form carrying the
    /// searched name.
    pub fn open_form_from_search(&mut self) {
        let mut form = RsvpForm::blank();
        form.set_name(self.query.trim());
        self.form = Some(form);
        self.set_form(FormStatus::OpenNew);
    }

    /// Closes the form and discards its contents.
    pub fn close_form(&mut self) -> Option<PendingScroll> {
        self.form.take()?;
        self.set_form(FormStatus::Closed);
        Some(PendingScroll::default())
    }

    /// Validates and saves the open form.
    ///
    /// On failure the form stays open with its contents intact.
    pub async fn save(&mut self) -> Result<SaveOutcome, RsvpError> {
        let mut form = self.form.clone().ok_or(RsvpError::FormClosed)?;
        form.draft.name = form.draft.name.trim().to_string();

        let missing = form.draft.missing_fields();
        if !missing.is_empty() {
            debug!("RSVP form incomplete: {:?}", missing);
            return Err(RsvpError::MissingFields(missing));
        }

        let reopened = self.status().form;
        self.set_form(FormStatus::Submitting);

        match self.submit(&form).await {
            Ok((kind, record)) => {
                info!("RSVP {:?} id={}", kind, record.id);
                self.query.clear();
                self.results.clear();
                self.form = None;
                self.status.send_replace(RsvpStatus::default());
                Ok(SaveOutcome {
                    kind,
                    record,
                    scroll: PendingScroll::default(),
                })
            }
            Err(e) => {
                warn!("RSVP save did not complete: {}", e);
                self.set_form(reopened);
                Err(e)
            }
        }
    }

    async fn submit(&self, form: &RsvpForm) -> Result<(SaveKind, RsvpRecord), RsvpError> {
        if let Some(id) = &form.id {
            let record = self
                .store
                .update_rsvp(id, form.draft.clone())
                .await
                .map_err(RsvpError::Save)?;
            return Ok((SaveKind::Updated, record));
        }

        let existing = self
            .store
            .find_by_identity(&form.draft.name, &form.draft.birthdate)
            .await
            .map_err(RsvpError::Save)?;
        if !existing.is_empty() {
            return Err(RsvpError::Duplicate);
        }

        let record = self
            .store
            .create_rsvp(form.draft.clone())
            .await
            .map_err(RsvpError::Save)?;
        Ok((SaveKind::Created, record))
    }
}
