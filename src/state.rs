use crate::color::ColorMap;
use crate::data::analysis::Analysis;
use crate::data::filter::{AnalysisConfig, FilterMode, GroupBy};
use crate::data::normalize::ColumnKeywords;
use crate::data::session::{LoadError, Session};
use crate::data::table::{preview_table, TableView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded sheet and its column binding (None until a load succeeds).
    pub session: Option<Session>,

    /// Column-name keywords used when binding a newly loaded sheet.
    pub keywords: ColumnKeywords,

    /// Grouping and filter controls.
    pub config: AnalysisConfig,

    /// Result for the current session and config (None while nothing is loaded).
    pub analysis: Option<Analysis>,

    /// Preview of every loaded row (cached per session).
    pub preview: TableView,

    /// Group label → box colour.
    pub color_map: ColorMap,

    /// File name of the active session, for the top bar.
    pub source_name: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: None,
            keywords: ColumnKeywords::default(),
            config: AnalysisConfig::default(),
            analysis: None,
            preview: TableView::default(),
            color_map: ColorMap::default(),
            source_name: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Apply the outcome of a load attempt.
    ///
    /// * success: the new session replaces the old one wholesale
    /// * decode failure: the previous session stays active
    /// * missing columns: everything is reset to the "nothing loaded" state
    pub fn apply_load(&mut self, result: Result<Session, LoadError>, source: &str) {
        match result {
            Ok(session) => {
                log::info!(
                    "Loaded {} rows from {source}, columns {:?}",
                    session.dataset().len(),
                    session.binding()
                );
                self.preview = preview_table(session.dataset());
                self.session = Some(session);
                self.source_name = Some(source.to_string());
                self.status_message = None;
                self.refresh();
            }
            Err(LoadError::MissingColumns(e)) => {
                log::warn!("Rejected {source}: {e}");
                self.clear();
                self.status_message = Some(format!("Error: {e}"));
            }
            Err(e @ LoadError::Decode(_)) => {
                log::error!("Failed to load {source}: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Re-run the analysis for the current session and controls.
    pub fn refresh(&mut self) {
        self.analysis = self.session.as_ref().map(|s| s.analyze(self.config));
        self.color_map = match &self.analysis {
            Some(a) => ColorMap::new(a.distributions.iter().map(|d| &d.label)),
            None => ColorMap::default(),
        };
    }

    pub fn set_group_by(&mut self, group_by: GroupBy) {
        if self.config.group_by != group_by {
            self.config.group_by = group_by;
            self.refresh();
        }
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        if self.config.filter != filter {
            self.config.filter = filter;
            self.refresh();
        }
    }

    fn clear(&mut self) {
        self.session = None;
        self.analysis = None;
        self.preview = TableView::default();
        self.color_map = ColorMap::default();
        self.source_name = None;
    }
}
