use livescope::persistence::{
    load_state_from_path, save_state_to_path, state_from_json, state_to_json, ScopeStateSerde,
};
use livescope::{SeriesRef, TriggerMode, TriggerSlope, TriggerType};

fn sample_state() -> ScopeStateSerde {
    let mut state = ScopeStateSerde::default();
    state.trigger.enabled = true;
    state.trigger.mode = TriggerMode::Normal;
    state.trigger.trigger_type = TriggerType::Pulse;
    state.trigger.slope = TriggerSlope::Falling;
    state.trigger.level = 2.5;
    state.trigger.auto_level = false;
    state.trigger.holdoff_s = 0.05;
    state.trigger.target = Some(SeriesRef::new("cpu.load"));
    state.trigger.min_pulse_width_s = 0.001;
    state.visible_duration_s = 30.0;
    state
}

#[test]
fn json_round_trip() {
    let state = sample_state();
    let json = state_to_json(&state).expect("serialize");
    let restored = state_from_json(&json).expect("deserialize");
    assert_eq!(restored.trigger.trigger_type, TriggerType::Pulse);
    assert_eq!(restored.trigger.slope, TriggerSlope::Falling);
    assert_eq!(restored.trigger.level, 2.5);
    assert_eq!(restored.trigger.target, Some(SeriesRef::new("cpu.load")));
    assert_eq!(restored.visible_duration_s, 30.0);
}

#[test]
fn file_round_trip_json_and_yaml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = sample_state();

    let json_path = dir.path().join("state.json");
    save_state_to_path(&state, &json_path).expect("save json");
    let restored = load_state_from_path(&json_path).expect("load json");
    assert_eq!(restored.trigger.holdoff_s, 0.05);

    let yaml_path = dir.path().join("state.yaml");
    save_state_to_path(&state, &yaml_path).expect("save yaml");
    let restored = load_state_from_path(&yaml_path).expect("load yaml");
    assert_eq!(restored.trigger.min_pulse_width_s, 0.001);
    assert_eq!(restored.trigger.mode, TriggerMode::Normal);
}

#[test]
fn load_missing_file_is_an_io_error() {
    let err = load_state_from_path(std::path::Path::new("/nonexistent/livescope-state.json"))
        .expect_err("missing file");
    assert!(matches!(
        err,
        livescope::persistence::PersistenceError::Io(_)
    ));
}

#[test]
fn version_counter_is_not_persisted() {
    let mut state = sample_state();
    state.trigger.touch();
    state.trigger.touch();
    let json = state_to_json(&state).expect("serialize");
    let restored = state_from_json(&json).expect("deserialize");
    assert_eq!(restored.trigger.version(), 0, "version is runtime-only state");
}
