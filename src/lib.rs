use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use crate::{
    detector::multi_layer::MultiLayerDetector,
    detector::vision::VisionClient,
    device::adb::AdbChannel,
    device::channel::{DeviceChannel, KEY_HOME},
    error::ExploreError,
    executor::executor as exec,
    instrument::client::Instrumentation,
    instrument::paths::PathStore,
    nav::tabs::NavDetector,
    policy::app_state::{self, AppState},
    policy::policy::{Decision, duties_for, forced_nav_point, select_action},
    policy::recovery::{self, Remedy},
    policy::session::SessionState,
    report::summary::{ArtifactWriter, SessionSummary, log_progress},
    score::keywords::{self, FORENSIC_SCENARIOS},
    state::tracker::ScreenTracker,
    trace::logger::TraceLogger,
    trace::trace::TraceEvent,
};

pub mod cli;
pub mod detector;
pub mod device;
pub mod error;
pub mod executor;
pub mod instrument;
pub mod nav;
pub mod policy;
pub mod report;
pub mod score;
pub mod snapshot;
pub mod state;
pub mod trace;

const LOOP_PAUSE: Duration = Duration::from_millis(400);
const RELAUNCH_WAIT: Duration = Duration::from_millis(2000);
const READY_ATTEMPTS: u32 = 5;
const PROGRESS_EVERY: u64 = 10;
const SCENARIO_POKE_LIMIT: usize = 3;

/// Everything a session needs, resolved from CLI and config.
pub struct ExploreOptions {
    pub package: String,
    pub duration: Duration,
    pub output_dir: PathBuf,
    pub seed: u64,
    pub save_ui_xml: bool,
    pub serial: Option<String>,
    pub vision_endpoint: Option<String>,
    pub agent_program: Option<String>,
    pub agent_args: Vec<String>,
    pub verbose: u8,
}

/// What the loop remembers about its previous action so the next snapshot
/// can judge whether it worked. The trace line is held back here until that
/// judgement lands, so it can carry the observed outcome.
struct LastAction {
    from_hash: String,
    signature: Option<String>,
    tab: Option<usize>,
    event: TraceEvent,
}

/// Run one full unattended exploration session against a live device.
pub fn run_exploration(opts: &ExploreOptions) -> Result<SessionSummary, ExploreError> {
    let mut device = AdbChannel::new(opts.serial.clone());
    device.probe()?;
    if !device.package_installed(&opts.package)? {
        return Err(ExploreError::FatalInit(format!(
            "package {} is not installed on the device",
            opts.package
        )));
    }
    let screen = device.screen_size()?;

    let mut writer = ArtifactWriter::new(&opts.output_dir, opts.save_ui_xml)?;
    let tracer = TraceLogger::new(&writer.trace_path());
    let vision = opts.vision_endpoint.as_deref().map(VisionClient::new);
    let mut detector = MultiLayerDetector::new(vision, writer.screenshot_path());
    let mut nav = NavDetector::new();
    let mut tracker = ScreenTracker::new();
    let mut paths = PathStore::new();
    let mut agent = Instrumentation::new(opts.agent_program.clone(), opts.agent_args.clone());

    let mut session = SessionState::new(&opts.package, screen, opts.duration, opts.seed);

    println!(
        "=== Exploring {} for {}s ({}x{}) ===",
        opts.package,
        opts.duration.as_secs(),
        screen.0,
        screen.1
    );

    ensure_app_ready(&mut device, &opts.package)?;
    agent.ensure_attached();

    let mut last_action: Option<LastAction> = None;

    // ---- Session loop ----
    while session.time_left() > Duration::ZERO {
        let foreground = match device.activity_dump() {
            Ok(dump) => app_state::classify_foreground(&dump, &opts.package),
            Err(e) => {
                eprintln!("[loop] activity dump failed: {}", e);
                sleep(LOOP_PAUSE);
                continue;
            }
        };

        match foreground.state {
            AppState::Launcher | AppState::OutOfApp => {
                if opts.verbose > 0 {
                    println!("[loop] left the app ({}), relaunching", foreground.activity);
                }
                if let Some(last) = last_action.take() {
                    tracer.log(&last.event.with_note("left_app"));
                }
                soft_fail(relaunch(&mut device, &mut session, &mut agent));
                continue;
            }
            AppState::Unknown => {
                sleep(LOOP_PAUSE);
                continue;
            }
            AppState::InApp => {}
        }

        if check_crash(&mut device, &mut session) {
            if let Some(last) = last_action.take() {
                tracer.log(&last.event.with_note("crash"));
            }
            soft_fail(relaunch(&mut device, &mut session, &mut agent));
            continue;
        }

        tracker.set_activity(&foreground.activity);
        session
            .coverage
            .activities
            .insert(foreground.activity.clone());

        if writer.save_ui_xml {
            if let Ok(xml) = device.ui_dump() {
                writer.save_ui_dump(&xml);
            }
        }

        let elements = detector.detect(&mut device, screen);
        nav.update(&elements, screen);

        let hash = tracker.compute_hash(&elements);
        let obs = tracker.observe(&hash);

        // Judge the previous action now that its effect is visible.
        if let Some(last) = last_action.take() {
            if let Some(sig) = &last.signature {
                tracker.record_transition(&last.from_hash, sig, &hash, obs.changed);
            }
            if obs.changed {
                if let Some(tab) = last.tab {
                    nav.mark_visited(tab);
                }
                if last.signature.is_some() {
                    session.depth += 1;
                }
                session.note_progress();
            }
            tracer.log(&last.event.with_result(obs.changed));
        }

        if obs.stuck || tracker.stuck_in_loop() {
            let remedy = recovery::escalate(&mut session);
            if opts.verbose > 0 {
                println!("[loop] stuck ({}x), remedy {:?}", session.stuck_count, remedy);
            }
            apply_remedy(&mut device, &mut session, &mut agent, &mut tracker, remedy);
            detector.invalidate();
            continue;
        }

        run_duties(&mut agent, &mut paths, session.action_count);

        let decision =
            select_action(&mut session, &tracker, &nav, &elements, &foreground.activity);

        let mut event = TraceEvent::now(
            session.action_count,
            foreground.state,
            &foreground.activity,
            &hash,
        )
        .with_decision(&decision);

        let mut acted_signature: Option<String> = None;
        let mut acted_tab: Option<usize> = None;

        match &decision {
            Decision::Tap { index } => {
                let elem = &elements[*index];
                event = event.with_target(&elem.signature, elem.center_x, elem.center_y);
                session.mark_tried(elem.center_x, elem.center_y);
                tracker.mark_element_visited(&hash, &elem.signature);
                acted_signature = Some(elem.signature.clone());
                soft_fail(exec::execute_tap(&mut device, &mut session, elem));
            }
            Decision::FillInput { index } => {
                let elem = elements[*index].clone();
                event = event.with_target(&elem.signature, elem.center_x, elem.center_y);
                session.mark_tried(elem.center_x, elem.center_y);
                tracker.mark_element_visited(&hash, &elem.signature);
                acted_signature = Some(elem.signature.clone());
                soft_fail(exec::run_input_sequence(&mut device, &mut session, &elem));
            }
            Decision::Scroll => {
                soft_fail(exec::scroll_content(&mut device, &mut session));
            }
            Decision::TapTab { tab } => {
                if let Some(t) = nav.tabs().get(*tab) {
                    let (x, y) = (t.x, t.y);
                    event = event.with_target(&format!("tab_{}", tab), x, y);
                    session.mark_tried(x, y);
                    acted_tab = Some(*tab);
                    soft_fail(device.tap(x, y));
                    sleep(RELAUNCH_WAIT);
                }
            }
            Decision::Back => {
                soft_fail(exec::press_back(&mut device));
                session.depth = session.depth.saturating_sub(1);
            }
            Decision::HomeReturn => {
                soft_fail(exec::press_back_n(&mut device, 5));
                soft_fail(ensure_app_ready(&mut device, &opts.package));
                agent.ensure_attached();
                session.depth = 0;
                session.full_reset_tried();
            }
            Decision::RunScenario { scenario } => {
                run_scenario(&mut device, &mut session, &mut detector, &nav, *scenario);
            }
            Decision::ForcedNav => {
                let (x, y) = forced_nav_point(screen);
                soft_fail(device.tap(x, y));
                session.partial_reset_tried();
            }
            Decision::FullEscape => {
                soft_fail(exec::press_back_n(&mut device, 5));
                soft_fail(device.key_event(KEY_HOME));
                soft_fail(relaunch(&mut device, &mut session, &mut agent));
                session.full_reset_tried();
                session.exhausted_streak = 0;
                tracker.reset_recent_hashes();
            }
        }

        detector.invalidate();
        session.action_count += 1;
        last_action = Some(LastAction {
            from_hash: hash,
            signature: acted_signature,
            tab: acted_tab,
            event,
        });

        if session.action_count % PROGRESS_EVERY == 0 {
            log_progress(&session, &tracker, &nav, paths.unique_count());
        }
    }

    // ---- Final drain and artifacts ----
    if let Some(last) = last_action.take() {
        tracer.log(&last.event.with_note("session_end"));
    }
    for e in agent.flush() {
        paths.record(&e);
    }
    for p in agent.scan_open_files() {
        paths.record_bare(&p, "open_files");
    }
    let agent_stats = agent.stats();

    let summary = SessionSummary::build(
        &session,
        &tracker,
        &nav,
        agent_stats,
        &paths,
        opts.duration.as_secs(),
    );
    writer.write_summary(&summary)?;
    writer.write_paths_csv(&paths)?;

    println!(
        "=== Session complete: {} actions, {} screens, {} paths ===",
        summary.total_actions,
        summary.coverage.screens,
        summary.unique_paths
    );

    Ok(summary)
}

/// Launch the app and poll the foreground until it holds focus.
fn ensure_app_ready(device: &mut dyn DeviceChannel, package: &str) -> Result<(), ExploreError> {
    for attempt in 0..READY_ATTEMPTS {
        device.launch_app(package)?;
        sleep(RELAUNCH_WAIT);
        if let Ok(dump) = device.activity_dump() {
            if app_state::classify_foreground(&dump, package).state == AppState::InApp {
                return Ok(());
            }
        }
        if attempt + 1 < READY_ATTEMPTS {
            // Kick back to the launcher before retrying.
            let _ = device.key_event(KEY_HOME);
            sleep(LOOP_PAUSE);
        }
    }
    Err(ExploreError::FatalInit(format!(
        "{} never reached the foreground",
        package
    )))
}

fn relaunch(
    device: &mut dyn DeviceChannel,
    session: &mut SessionState,
    agent: &mut Instrumentation,
) -> Result<(), ExploreError> {
    let package = session.package.clone();
    ensure_app_ready(device, &package)?;
    agent.ensure_attached();
    session.depth = 0;
    Ok(())
}

/// Crash and system-dialog heuristics, cheapest first. A hit counts a crash
/// and taps where the dismiss button usually is.
fn check_crash(device: &mut AdbChannel, session: &mut SessionState) -> bool {
    let pkg = session.package.clone();

    let crashed = device
        .window_dump()
        .map(|d| app_state::system_dialog_has_focus(&d, &pkg))
        .unwrap_or(false)
        || device
            .process_dump()
            .map(|d| app_state::process_in_error_state(&d, &pkg))
            .unwrap_or(false)
        || device
            .recent_errors()
            .map(|d| app_state::fatal_in_logs(&d, &pkg))
            .unwrap_or(false);

    if crashed {
        eprintln!("[loop] crash detected for {}", pkg);
        session.coverage.crashes += 1;
        let (x, y) = app_state::crash_dismiss_point(session.screen);
        let _ = device.tap(x, y);
        sleep(Duration::from_millis(1000));
    }
    crashed
}

fn apply_remedy(
    device: &mut dyn DeviceChannel,
    session: &mut SessionState,
    agent: &mut Instrumentation,
    tracker: &mut ScreenTracker,
    remedy: Remedy,
) {
    match remedy {
        Remedy::Back => soft_fail(exec::press_back(device)),
        Remedy::DoubleBack => soft_fail(exec::press_back_n(device, 2)),
        Remedy::SwipeBack => {
            soft_fail(exec::swipe_up(device, session.screen));
            soft_fail(exec::press_back(device));
        }
        Remedy::HomeRelaunch => {
            soft_fail(device.key_event(KEY_HOME));
            soft_fail(relaunch(device, session, agent));
        }
        Remedy::FullRecovery => {
            let pkg = session.package.clone();
            soft_fail(device.force_stop(&pkg));
            soft_fail(device.key_event(KEY_HOME));
            soft_fail(relaunch(device, session, agent));
            session.stuck_count = 0;
            session.depth = 0;
            session.full_reset_tried();
            tracker.reset_recent_hashes();
        }
    }
    sleep(LOOP_PAUSE);
}

/// Best-effort background duties on their action-count cadences.
fn run_duties(agent: &mut Instrumentation, paths: &mut PathStore, action_count: u64) {
    let duties = duties_for(action_count);
    if duties.agent_check {
        agent.check_alive();
        agent.ensure_attached();
    }
    if duties.flush {
        for e in agent.flush() {
            paths.record(&e);
        }
    }
    if duties.open_file_scan {
        for p in agent.scan_open_files() {
            paths.record_bare(&p, "open_files");
        }
    }
    if duties.memory_scan {
        let found = agent.trigger_memory_scan();
        if found > 0 {
            println!("[agent] memory scan found {} new paths", found);
        }
    }
}

/// Keyword-driven detour toward a known artifact-bearing app area: optionally
/// go through the menu tab, tap the first matching element, poke a few
/// clickables on the resulting screen, then back out.
fn run_scenario(
    device: &mut AdbChannel,
    session: &mut SessionState,
    detector: &mut MultiLayerDetector,
    nav: &NavDetector,
    index: usize,
) {
    let Some(scenario) = FORENSIC_SCENARIOS.get(index) else {
        return;
    };
    // One shot per scenario, successful or not.
    session.scenarios_done.insert(index);

    println!("[scenario] running '{}'", scenario.name);

    if scenario.via_menu {
        if let Some(tab) = nav.tabs().last() {
            soft_fail(device.tap(tab.x, tab.y));
            sleep(RELAUNCH_WAIT);
            detector.invalidate();
        }
    }

    let screen = session.screen;
    let elements = detector.detect(device, screen);
    // No blacklist here: scenarios deliberately enter screens (privacy,
    // settings) that random taps are told to avoid.
    let entry = elements
        .iter()
        .find(|e| keywords::matches_any(&e.haystack(), scenario.keywords));
    let Some(entry) = entry else {
        println!("[scenario] '{}': no matching element", scenario.name);
        return;
    };
    soft_fail(device.tap(entry.center_x, entry.center_y));
    sleep(RELAUNCH_WAIT);
    detector.invalidate();

    let inside = detector.detect(device, screen);
    for e in inside
        .iter()
        .filter(|e| e.clickable && !keywords::is_blacklisted(&e.haystack()))
        .take(SCENARIO_POKE_LIMIT)
    {
        soft_fail(device.tap(e.center_x, e.center_y));
        sleep(Duration::from_millis(800));
    }

    soft_fail(exec::press_back_n(device, 2));
    detector.invalidate();
    session.coverage.scenarios_executed += 1;
}

/// Device failures inside the loop are soft: log and reassess next iteration.
fn soft_fail(result: Result<(), ExploreError>) {
    if let Err(e) = result {
        eprintln!("[loop] action failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::scripted::ScriptedDevice;

    #[test]
    fn full_recovery_resets_counters_even_when_the_relaunch_fails() {
        let mut device = ScriptedDevice::new((1080, 2340));
        device.fail_launch = true;

        let mut session =
            SessionState::new("com.example.app", (1080, 2340), Duration::from_secs(60), 1);
        session.stuck_count = 7;
        session.depth = 3;
        let mut agent = Instrumentation::new(None, Vec::new());
        let mut tracker = ScreenTracker::new();

        apply_remedy(
            &mut device,
            &mut session,
            &mut agent,
            &mut tracker,
            Remedy::FullRecovery,
        );

        assert_eq!(
            session.stuck_count, 0,
            "an unreachable app must not keep the session stuck at the top of the ladder"
        );
        assert_eq!(session.depth, 0, "full recovery zeroes the depth counter");
    }
}
