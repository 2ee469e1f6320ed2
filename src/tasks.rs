use crate::codec::{self, FormatError};
use crate::models::{Session, Task, TaskDraft, TaskStatus};
use crate::repo::{RepoError, TaskRepository};
use crate::store::RowStore;

/// The five status buckets of the task list's tab selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKey {
    #[default]
    All,
    ToDo,
    InProgress,
    Review,
    Completed,
}

impl FilterKey {
    pub const ALL_KEYS: [FilterKey; 5] = [
        Self::All,
        Self::ToDo,
        Self::InProgress,
        Self::Review,
        Self::Completed,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ToDo => "to-do",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Completed => "completed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "all" => Some(Self::All),
            "to-do" => Some(Self::ToDo),
            "in-progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            _ => normalize_status(&task.status) == self.as_key(),
        }
    }
}

/// Filter-key form of a wire status: lower-cased, spaces to hyphens
/// ("In Progress" -> "in-progress"). Statuses with odd casing or spacing
/// still route to the right tab; anything else matches no bucket.
pub fn normalize_status(status: &str) -> String {
    status.to_lowercase().replace(' ', "-")
}

/// Per-bucket tallies, recomputed from the full set on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub all: usize,
    pub to_do: usize,
    pub in_progress: usize,
    pub review: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn get(&self, key: FilterKey) -> usize {
        match key {
            FilterKey::All => self.all,
            FilterKey::ToDo => self.to_do,
            FilterKey::InProgress => self.in_progress,
            FilterKey::Review => self.review,
            FilterKey::Completed => self.completed,
        }
    }
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

/// Result of a best-effort import: how many records landed and how many
/// the store rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOutcome {
    pub inserted: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub enum ImportError {
    Format(FormatError),
    Repo(RepoError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Format(err) => write!(f, "{err}"),
            ImportError::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<FormatError> for ImportError {
    fn from(value: FormatError) -> Self {
        ImportError::Format(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        ImportError::Repo(value)
    }
}

/// Owns the authoritative task set for one signed-in session plus the
/// active filter. Every mutation goes through the repository and is
/// followed by a full re-fetch; the visible list is always replaced
/// wholesale, never patched in place.
pub struct TaskList<S> {
    repo: TaskRepository<S>,
    session: Session,
    tasks: Vec<Task>,
    filter: FilterKey,
}

impl<S: RowStore> TaskList<S> {
    pub fn new(repo: TaskRepository<S>, session: Session) -> Self {
        Self {
            repo,
            session,
            tasks: Vec::new(),
            filter: FilterKey::All,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> FilterKey {
        self.filter
    }

    /// Pure state change; no I/O.
    pub fn set_filter(&mut self, filter: FilterKey) {
        self.filter = filter;
    }

    /// Tasks under the active filter, lazily.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        let filter = self.filter;
        self.tasks.iter().filter(move |task| filter.matches(task))
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            all: self.tasks.len(),
            ..StatusCounts::default()
        };
        for task in &self.tasks {
            match normalize_status(&task.status).as_str() {
                "to-do" => counts.to_do += 1,
                "in-progress" => counts.in_progress += 1,
                "review" => counts.review += 1,
                "completed" => counts.completed += 1,
                _ => {}
            }
        }
        counts
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        let counts = self.counts();
        DashboardStats {
            total: counts.all,
            completed: counts.completed,
            in_progress: counts.in_progress,
        }
    }

    /// Re-fetches the full set and replaces the in-memory list. On error
    /// the previous list is left untouched.
    pub async fn refresh(&mut self) -> Result<(), RepoError> {
        let fresh = self.repo.list_for_user(&self.session).await?;
        log::debug!("refreshed task list: {} tasks", fresh.len());
        self.tasks = fresh;
        Ok(())
    }

    pub async fn create_task(&mut self, draft: &TaskDraft) -> Result<(), RepoError> {
        let task = self.repo.create(&self.session, draft).await?;
        log::info!("created task: {}", task.title);
        self.refresh().await
    }

    pub async fn change_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), RepoError> {
        self.repo
            .update_status(&self.session, task_id, status)
            .await?;
        log::info!("task {task_id} moved to {}", status.as_str());
        self.refresh().await
    }

    /// The user's newest tasks for the dashboard summary; does not touch
    /// the authoritative list.
    pub async fn recent_tasks(&self, limit: usize) -> Result<Vec<Task>, RepoError> {
        self.repo.list_recent(&self.session, limit).await
    }

    pub fn export_tasks(&self) -> Result<String, FormatError> {
        codec::export_document(&self.tasks)
    }

    /// Parses and inserts an imported document, then re-fetches. Only an
    /// unparseable document fails the import; rejected records are
    /// counted and the rest still land.
    pub async fn import_tasks(&mut self, document: &str) -> Result<ImportOutcome, ImportError> {
        let records = codec::import_document(document)?;
        let total = records.len();
        let outcomes = self.repo.bulk_insert(&self.session, records).await;
        let inserted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let outcome = ImportOutcome {
            inserted,
            failed: total - inserted,
        };
        log::info!(
            "import complete: {} inserted, {} rejected",
            outcome.inserted,
            outcome.failed
        );
        self.refresh().await?;
        Ok(outcome)
    }
}
