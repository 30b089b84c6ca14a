use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExploreError;
use crate::instrument::client::AgentStats;
use crate::instrument::paths::PathStore;
use crate::nav::tabs::NavDetector;
use crate::policy::session::SessionState;
use crate::score::keywords::FORENSIC_SCENARIOS;
use crate::state::tracker::ScreenTracker;

/// Coverage block of the session summary.
#[derive(Debug, Serialize)]
pub struct CoverageSummary {
    pub activities: Vec<String>,
    pub screens: usize,
    pub nav_tabs_detected: usize,
    pub nav_tabs_visited: usize,
    pub nav_tabs_info: Vec<String>,
    pub scenarios_executed: Vec<String>,
    pub inputs: u64,
    pub submits: u64,
    pub scrolls: u64,
    pub transitions: u64,
    pub crashes: u64,
}

/// Top-level `summary.json` artifact consumed by the downstream pipeline.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub package: String,
    pub planned_duration_secs: u64,
    pub actual_duration_secs: u64,
    pub total_actions: u64,
    pub coverage: CoverageSummary,
    pub agent_stats: AgentStats,
    pub unique_paths: usize,
    pub timestamp: String,
}

impl SessionSummary {
    pub fn build(
        session: &SessionState,
        tracker: &ScreenTracker,
        nav: &NavDetector,
        agent_stats: AgentStats,
        paths: &PathStore,
        planned_duration_secs: u64,
    ) -> Self {
        let mut activities: Vec<String> =
            session.coverage.activities.iter().cloned().collect();
        activities.sort();

        let scenarios_executed = {
            let mut done: Vec<usize> = session.scenarios_done.iter().copied().collect();
            done.sort();
            done.into_iter()
                .filter_map(|i| FORENSIC_SCENARIOS.get(i))
                .map(|s| s.name.to_string())
                .collect()
        };

        SessionSummary {
            package: session.package.clone(),
            planned_duration_secs,
            actual_duration_secs: session.elapsed_secs(),
            total_actions: session.action_count,
            coverage: CoverageSummary {
                activities,
                screens: tracker.screens_seen(),
                nav_tabs_detected: nav.tab_count(),
                nav_tabs_visited: nav.visited_count(),
                nav_tabs_info: nav.tabs().iter().map(|t| t.label.clone()).collect(),
                scenarios_executed,
                inputs: session.coverage.inputs_filled,
                submits: session.coverage.submits_found,
                scrolls: session.coverage.scrolls,
                transitions: tracker.transition_count(),
                crashes: session.coverage.crashes,
            },
            agent_stats,
            unique_paths: paths.unique_count(),
            timestamp: iso_timestamp(),
        }
    }
}

/// Directory layout and writers for everything the session leaves behind.
pub struct ArtifactWriter {
    out_dir: PathBuf,
    ui_xml_seq: u32,
    pub save_ui_xml: bool,
}

impl ArtifactWriter {
    pub fn new(out_dir: &Path, save_ui_xml: bool) -> Result<Self, ExploreError> {
        fs::create_dir_all(out_dir).map_err(|e| ExploreError::Artifact {
            path: out_dir.display().to_string(),
            source: e,
        })?;
        if save_ui_xml {
            let xml_dir = out_dir.join("ui_xml");
            fs::create_dir_all(&xml_dir).map_err(|e| ExploreError::Artifact {
                path: xml_dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(ArtifactWriter {
            out_dir: out_dir.to_path_buf(),
            ui_xml_seq: 0,
            save_ui_xml,
        })
    }

    pub fn trace_path(&self) -> PathBuf {
        self.out_dir.join("action_trace.jsonl")
    }

    pub fn screenshot_path(&self) -> PathBuf {
        self.out_dir.join("temp_screen.png")
    }

    /// Archive one raw hierarchy dump, sequence-numbered. Best-effort.
    pub fn save_ui_dump(&mut self, xml: &str) {
        if !self.save_ui_xml {
            return;
        }
        self.ui_xml_seq += 1;
        let path = self
            .out_dir
            .join("ui_xml")
            .join(format!("ui_{:04}.xml", self.ui_xml_seq));
        if let Err(e) = fs::write(&path, xml) {
            eprintln!("Warning: could not archive ui dump {}: {}", path.display(), e);
        }
    }

    pub fn write_summary(&self, summary: &SessionSummary) -> Result<(), ExploreError> {
        let path = self.out_dir.join("summary.json");
        let json =
            serde_json::to_string_pretty(summary).map_err(|e| ExploreError::JsonSerialize {
                context: "session summary".into(),
                source: e,
            })?;
        fs::write(&path, json).map_err(|e| ExploreError::Artifact {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn write_paths_csv(&self, paths: &PathStore) -> Result<(), ExploreError> {
        let path = self.out_dir.join("collected_paths.csv");
        fs::write(&path, paths.to_csv()).map_err(|e| ExploreError::Artifact {
            path: path.display().to_string(),
            source: e,
        })
    }
}

pub fn iso_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// One-line periodic progress report.
pub fn log_progress(
    session: &SessionState,
    tracker: &ScreenTracker,
    nav: &NavDetector,
    unique_paths: usize,
) {
    println!(
        "Progress: {}s | Actions:{} | Depth:{} | Activities:{} | Screens:{} | Tabs:{}/{} | Scenarios:{} | Paths:{}",
        session.elapsed_secs(),
        session.action_count,
        session.depth,
        session.coverage.activities.len(),
        tracker.screens_seen(),
        nav.visited_count(),
        nav.tab_count(),
        session.coverage.scenarios_executed,
        unique_paths
    );
}
