// Integration tests for the undo/redo wrapper.
//
// These tests drive complete stores through the wrapper: a todo list, a
// segmented multi-document store, and a hand-rolled counter state with its
// own patch engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use serde_json::{json, Value};

use rewind_core::{
    Action, ActionKinds, Draft, Histories, History, HistoryKey, HistorySelectors, JsonPatch,
    JsonPatchEngine, JsonState, JsonUndoRedo, OnReducer, PatchEngine, PatchSink, Patches, Reducer,
    UndoRedo, UndoRedoConfig, UndoRedoSettings, UndoRedoState,
};

// ── Todo store ─────────────────────────────────────────────────────────

fn todos_initial() -> Value {
    json!({"todos": [], "view": "all", "mood": 0})
}

fn todo_index(draft: &Draft<'_>, id: &str) -> Result<usize> {
    draft
        .get("/todos")
        .and_then(Value::as_array)
        .and_then(|todos| todos.iter().position(|todo| todo["id"] == id))
        .ok_or_else(|| anyhow!("no todo {id}"))
}

fn todos() -> OnReducer {
    OnReducer::new(todos_initial())
        .on(&["addTodo"], |draft, action| {
            let id = action.get_str("id").unwrap_or_default();
            let text = action.get_str("text").unwrap_or_default();
            draft.push("/todos", json!({"id": id, "text": text, "done": false}))
        })
        .on(&["toggleTodo"], |draft, action| {
            let index = todo_index(draft, action.get_str("id").unwrap_or_default())?;
            let pointer = format!("/todos/{index}/done");
            let done = draft.get(&pointer).and_then(Value::as_bool).unwrap_or(false);
            draft.set(&pointer, !done)
        })
        .on(&["removeTodo"], |draft, action| {
            let index = todo_index(draft, action.get_str("id").unwrap_or_default())?;
            draft.remove(&format!("/todos/{index}")).map(|_| ())
        })
        .on(&["setView"], |draft, action| {
            draft.set("/view", action.get_str("view").unwrap_or("all"))
        })
        .on(&["incrementMood"], |draft, _| {
            let mood = draft.get_i64("/mood").unwrap_or(0);
            draft.set("/mood", mood + 1)
        })
        .on(&["reset"], |draft, _| {
            draft.replace(todos_initial());
            Ok(())
        })
        .on(&["wiggleMood"], |draft, _| {
            let mood = draft.get_i64("/mood").unwrap_or(0);
            draft.set("/mood", mood + 5)?;
            draft.set("/mood", mood)
        })
}

fn add(id: &str) -> Action {
    Action::new("addTodo")
        .with("id", id)
        .with("text", format!("do {id}"))
}

fn toggle(id: &str) -> Action {
    Action::new("toggleTodo").with("id", id)
}

fn mood() -> Action {
    Action::new("incrementMood")
}

fn undo() -> Action {
    Action::new("UNDO")
}

fn redo() -> Action {
    Action::new("REDO")
}

fn start<R: Reducer<JsonState>>(reducer: &R) -> JsonState {
    reducer.reduce(None, &Action::new("@@INIT"))
}

fn run<R: Reducer<JsonState>>(reducer: &R, state: JsonState, actions: &[Action]) -> JsonState {
    actions
        .iter()
        .fold(state, |state, action| reducer.reduce(Some(state), action))
}

fn ids(state: &JsonState) -> Vec<String> {
    state.data["todos"]
        .as_array()
        .map(|todos| {
            todos
                .iter()
                .filter_map(|todo| todo["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn default_history(state: &JsonState) -> &History<JsonPatch> {
    state
        .histories
        .get(&HistoryKey::default())
        .expect("default stream")
}

// ── Record / Undo / Redo ───────────────────────────────────────────────

#[test]
fn test_counter_merged_increments_undo_to_zero() {
    let wrapped = OnReducer::new(json!({"count": 0}))
        .on(&["increment"], |draft, _| {
            let count = draft.get_i64("/count").unwrap_or(0);
            draft.set("/count", count + 1)
        })
        .wrap(UndoRedoConfig::new().merge(["increment"]));

    let increment = Action::new("increment");
    let state = start(&wrapped);
    let state = run(&wrapped, state, &[increment.clone(), increment.clone(), increment]);
    assert_eq!(state.data["count"], 3);

    let history = default_history(&state);
    assert_eq!(history.undoable.len(), 1);
    assert_eq!(history.latest().unwrap().actions.len(), 3);

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(state.data["count"], 0);
    assert!(default_history(&state).can_redo());
}

#[test]
fn test_undo_then_redo_restores_identical_state() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let state = run(&wrapped, start(&wrapped), &[add("a"), add("b")]);
    let before = state.clone();

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(ids(&state), vec!["a"]);

    let state = wrapped.reduce(Some(state), &redo());
    assert_eq!(state, before);
}

#[test]
fn test_undo_everything_restores_initial_document() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let actions = [
        add("a"),
        add("b"),
        toggle("a"),
        Action::new("setView").with("view", "done"),
        mood(),
        Action::new("removeTodo").with("id", "b"),
    ];
    let edited = run(&wrapped, start(&wrapped), &actions);
    assert_eq!(ids(&edited), vec!["a"]);
    assert_eq!(edited.data["todos"][0]["done"], true);

    let undos = vec![undo(); actions.len()];
    let state = run(&wrapped, edited.clone(), &undos);
    assert_eq!(state.data, todos_initial());
    assert!(!default_history(&state).can_undo());
    assert_eq!(default_history(&state).undone.len(), actions.len());

    let redos = vec![redo(); actions.len()];
    let state = run(&wrapped, state, &redos);
    assert_eq!(state, edited);
}

#[test]
fn test_new_action_after_undo_discards_redo() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let state = run(&wrapped, start(&wrapped), &[add("a"), add("b"), undo(), add("c")]);

    assert_eq!(ids(&state), vec!["a", "c"]);
    let history = default_history(&state);
    assert!(!history.can_redo());
    assert_eq!(history.undoable.len(), 2);
}

#[test]
fn test_undo_and_redo_with_empty_stacks_are_noops() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let state = start(&wrapped);
    assert_eq!(wrapped.reduce(Some(state.clone()), &undo()), state);
    assert_eq!(wrapped.reduce(Some(state.clone()), &redo()), state);
}

#[test]
fn test_reset_is_undone_as_one_step() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let state = run(
        &wrapped,
        start(&wrapped),
        &[add("a"), add("b"), Action::new("reset")],
    );
    assert!(ids(&state).is_empty());

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(ids(&state), vec!["a", "b"]);
}

#[test]
fn test_net_zero_action_keeps_redo_available() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let state = run(&wrapped, start(&wrapped), &[mood(), undo()]);
    let before = state.clone();

    // the handler edits the document and then restores it
    let state = wrapped.reduce(Some(state), &Action::new("wiggleMood"));
    assert_eq!(state, before);
    let history = default_history(&state);
    assert!(!history.can_undo());
    assert!(history.can_redo());

    let state = wrapped.reduce(Some(state), &redo());
    assert_eq!(state.data["mood"], 1);
}

#[test]
fn test_failing_handler_keeps_redo_available() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let state = run(&wrapped, start(&wrapped), &[add("a"), undo()]);

    // no todo "zzz": the handler fails and the change is discarded
    let state = wrapped.reduce(Some(state), &Action::new("removeTodo").with("id", "zzz"));
    assert!(ids(&state).is_empty());
    assert!(default_history(&state).can_redo());
}

#[test]
fn test_first_call_delegates_without_history() {
    let wrapped = todos().wrap(UndoRedoConfig::new());

    let state = wrapped.reduce(None, &undo());
    assert_eq!(state.data, todos_initial());
    assert!(state.histories.is_empty());

    // there is no state to resolve a stream from, so nothing is recorded
    let state = wrapped.reduce(None, &add("a"));
    assert_eq!(ids(&state), vec!["a"]);
    assert!(state.histories.is_empty());
}

// ── Merging ────────────────────────────────────────────────────────────

#[test]
fn test_merge_kind_collapses_consecutive_actions() {
    let wrapped = todos().wrap(UndoRedoConfig::new().merge(["incrementMood"]));
    let state = run(&wrapped, start(&wrapped), &[add("a"), mood(), mood(), mood()]);
    assert_eq!(state.data["mood"], 3);
    assert_eq!(default_history(&state).undoable.len(), 2);

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(state.data["mood"], 0);
    assert_eq!(ids(&state), vec!["a"]);

    let state = wrapped.reduce(Some(state), &undo());
    assert!(ids(&state).is_empty());
}

#[test]
fn test_other_kind_interrupts_merge() {
    let wrapped = todos().wrap(UndoRedoConfig::new().merge(["incrementMood"]));
    let state = run(&wrapped, start(&wrapped), &[mood(), add("a"), mood()]);
    assert_eq!(default_history(&state).undoable.len(), 3);
}

#[test]
fn test_merge_rule_decides_per_pair() {
    let merge = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&merge);
    let config =
        UndoRedoConfig::new().merge_rule("incrementMood", move |_, _| flag.load(Ordering::SeqCst));
    let wrapped = todos().wrap(config);

    let state = run(&wrapped, start(&wrapped), &[mood(), mood()]);
    assert_eq!(default_history(&state).undoable.len(), 1);

    merge.store(false, Ordering::SeqCst);
    let state = wrapped.reduce(Some(state), &mood());
    assert_eq!(default_history(&state).undoable.len(), 2);

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(state.data["mood"], 2);
}

#[test]
fn test_break_merge_starts_new_step() {
    let wrapped = todos().wrap(UndoRedoConfig::new().merge(["incrementMood"]));
    let state = run(
        &wrapped,
        start(&wrapped),
        &[mood(), mood(), Action::new("BREAK_MERGE")],
    );
    assert!(default_history(&state).merge_broken);
    assert_eq!(state.data["mood"], 2);

    let state = run(&wrapped, state, &[mood(), mood()]);
    let history = default_history(&state);
    assert_eq!(history.undoable.len(), 2);
    assert!(!history.merge_broken);

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(state.data["mood"], 2);
}

// ── Buffer, allow-list, payloads ───────────────────────────────────────

#[test]
fn test_buffer_evicts_oldest_step() {
    let wrapped = todos().wrap(UndoRedoConfig::new().max_buffer_size(3));
    let state = run(
        &wrapped,
        start(&wrapped),
        &[add("a"), add("b"), add("c"), add("d")],
    );
    assert_eq!(default_history(&state).undoable.len(), 3);

    let state = run(&wrapped, state, &[undo(), undo(), undo()]);
    // the first add fell out of the buffer and can no longer be undone
    assert_eq!(ids(&state), vec!["a"]);
    assert!(!default_history(&state).can_undo());
    assert_eq!(wrapped.reduce(Some(state.clone()), &undo()), state);
}

#[test]
fn test_allow_list_leaves_other_changes_in_place() {
    let wrapped = todos().wrap(UndoRedoConfig::new().allow(["addTodo"]));
    let state = run(
        &wrapped,
        start(&wrapped),
        &[add("a"), Action::new("setView").with("view", "done"), add("b")],
    );
    assert_eq!(default_history(&state).undoable.len(), 2);

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(ids(&state), vec!["a"]);
    assert_eq!(state.data["view"], "done");

    let state = wrapped.reduce(Some(state), &undo());
    assert!(ids(&state).is_empty());
    assert_eq!(state.data["view"], "done");
}

#[test]
fn test_payloads_dropped_by_default() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let state = run(&wrapped, start(&wrapped), &[add("a")]);
    let recorded = default_history(&state).latest_action().unwrap();
    assert_eq!(recorded.kind(), "addTodo");
    assert!(!recorded.has_payload());
}

#[test]
fn test_payloads_tracked_when_enabled() {
    let wrapped = todos().wrap(UndoRedoConfig::new().track_payload(true));
    let state = run(&wrapped, start(&wrapped), &[add("a")]);
    let recorded = default_history(&state).latest_action().unwrap();
    assert_eq!(recorded.get_str("id"), Some("a"));
}

#[test]
fn test_payload_predicate_selects_actions() {
    let config = UndoRedoConfig::new().track_payload_when(|action| action.kind() == "addTodo");
    let wrapped = todos().wrap(config);
    let state = run(&wrapped, start(&wrapped), &[add("a"), toggle("a")]);

    let history = default_history(&state);
    assert!(!history.undoable[0].actions[0].has_payload());
    assert_eq!(history.undoable[1].actions[0].get_str("id"), Some("a"));
}

#[test]
fn test_custom_control_kinds() {
    let kinds = ActionKinds {
        undo: "history/undo".to_string(),
        redo: "history/redo".to_string(),
        break_merge: "history/break".to_string(),
        clear: "history/clear".to_string(),
    };
    let wrapped = todos().wrap(UndoRedoConfig::new().action_kinds(kinds));
    let state = run(&wrapped, start(&wrapped), &[add("a")]);

    // the stock kind is an ordinary action now
    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(ids(&state), vec!["a"]);

    let state = wrapped.reduce(Some(state), &Action::new("history/undo"));
    assert!(ids(&state).is_empty());

    let state = wrapped.reduce(Some(state), &Action::new("history/clear"));
    assert!(!default_history(&state).can_redo());
}

#[test]
fn test_settings_file_drives_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("undo-redo.json");
    std::fs::write(
        &path,
        r#"{"max_buffer_size": 2, "merge_action_kinds": ["incrementMood"]}"#,
    )
    .unwrap();

    let config = UndoRedoConfig::from(UndoRedoSettings::load_or_create(&path));
    assert_eq!(config.buffer_size(), 2);

    let wrapped = todos().wrap(config);
    let state = run(
        &wrapped,
        start(&wrapped),
        &[add("a"), add("b"), add("c"), mood(), mood()],
    );
    let history = default_history(&state);
    assert_eq!(history.undoable.len(), 2);
    assert_eq!(history.latest().unwrap().actions.len(), 2);
}

// ── Replay failures ────────────────────────────────────────────────────

#[test]
fn test_undo_that_no_longer_fits_keeps_state() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let mut state = run(&wrapped, start(&wrapped), &[add("a"), add("b")]);

    // edit the document behind the history's back
    state.data["todos"] = json!([]);
    let tampered = state.clone();

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(state, tampered);
    let history = default_history(&state);
    assert_eq!(history.undoable.len(), 2);
    assert!(!history.can_redo());
}

struct ReadOnlyEngine;

impl PatchEngine<JsonState> for ReadOnlyEngine {
    fn apply(&self, _state: &mut JsonState, _patches: &[JsonPatch]) -> Result<()> {
        bail!("document is read-only")
    }
}

#[test]
fn test_engine_failure_reverts_history_move() {
    let wrapped: UndoRedo<JsonState, _, _> =
        UndoRedo::wrap(todos(), ReadOnlyEngine, UndoRedoConfig::new());
    let state = run(&wrapped, start(&wrapped), &[add("a")]);

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(ids(&state), vec!["a"]);
    let history = default_history(&state);
    assert!(history.can_undo());
    assert!(!history.can_redo());
}

// ── Switch-style and custom-state reducers ─────────────────────────────

fn switch_todos(
    state: Option<JsonState>,
    action: &Action,
    sink: Option<&mut PatchSink<JsonPatch>>,
) -> JsonState {
    let mut state = state.unwrap_or_else(|| JsonState::new(todos_initial()));
    let produced = match action.kind() {
        "addTodo" => JsonPatchEngine.produce(&mut state, |draft| {
            draft.push("/todos", json!({"id": action.get_str("id"), "done": false}))
        }),
        "reset" => JsonPatchEngine.produce(&mut state, |draft| {
            draft.replace(todos_initial());
            Ok(())
        }),
        _ => return state,
    };
    if let (Ok(patches), Some(sink)) = (produced, sink) {
        sink.emit(patches);
    }
    state
}

#[test]
fn test_switch_reducer_function() {
    let wrapped: UndoRedo<JsonState, _, _> =
        UndoRedo::wrap(switch_todos, JsonPatchEngine, UndoRedoConfig::new());
    let state = run(
        &wrapped,
        start(&wrapped),
        &[add("a"), add("b"), Action::new("reset")],
    );
    assert!(ids(&state).is_empty());

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(ids(&state), vec!["a", "b"]);
    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(ids(&state), vec!["a"]);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Tally {
    value: i64,
    histories: Histories<i64>,
}

impl UndoRedoState for Tally {
    type Patch = i64;

    fn histories(&self) -> &Histories<i64> {
        &self.histories
    }

    fn histories_mut(&mut self) -> &mut Histories<i64> {
        &mut self.histories
    }
}

/// Patches are deltas; the tally never goes below zero.
struct DeltaEngine;

impl PatchEngine<Tally> for DeltaEngine {
    fn apply(&self, state: &mut Tally, patches: &[i64]) -> Result<()> {
        let value = patches.iter().fold(state.value, |value, delta| value + delta);
        if value < 0 {
            bail!("tally would drop to {value}");
        }
        state.value = value;
        Ok(())
    }
}

fn tally(state: Option<Tally>, action: &Action, sink: Option<&mut PatchSink<i64>>) -> Tally {
    let mut state = state.unwrap_or_default();
    if action.kind() != "add" {
        return state;
    }
    let delta = action.get("by").and_then(Value::as_i64).unwrap_or(1);
    state.value += delta;
    if let Some(sink) = sink {
        sink.emit(Patches::new(vec![delta], vec![-delta]));
    }
    state
}

#[test]
fn test_custom_state_and_engine() {
    let wrapped: UndoRedo<Tally, _, _> =
        UndoRedo::wrap(tally, DeltaEngine, UndoRedoConfig::new().merge(["add"]));
    let state = wrapped.reduce(None, &Action::new("@@INIT"));
    let state = wrapped.reduce(Some(state), &Action::new("add").with("by", 2));
    let state = wrapped.reduce(Some(state), &Action::new("add").with("by", 3));
    assert_eq!(state.value, 5);

    let history = state.histories.get(&HistoryKey::default()).unwrap();
    assert_eq!(history.undoable.len(), 1);
    assert_eq!(history.latest().unwrap().patches.inverse, vec![-3, -2]);

    let undone = wrapped.reduce(Some(state.clone()), &undo());
    assert_eq!(undone.value, 0);
    let redone = wrapped.reduce(Some(undone), &redo());
    assert_eq!(redone, state);

    // the inverse would go negative, so the engine refuses it
    let mut shrunk = state;
    shrunk.value = 1;
    let after = wrapped.reduce(Some(shrunk.clone()), &undo());
    assert_eq!(after, shrunk);
}

fn reduce_all<R, S>(reducer: &R, actions: &[Action]) -> Option<S>
where
    R: Reducer<S>,
{
    actions
        .iter()
        .fold(None, |state, action| Some(reducer.reduce(state, action)))
}

#[test]
fn test_wrapper_is_a_plain_reducer() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let actions = [Action::new("@@INIT"), add("a"), add("b"), undo()];
    let state: Option<JsonState> = reduce_all(&wrapped, &actions);
    assert_eq!(ids(&state.unwrap()), vec!["a"]);
}

// ── Segmented documents ────────────────────────────────────────────────

fn documents_initial() -> Value {
    json!({
        "activeDocument": "a",
        "documents": {
            "a": {"name": "A"},
            "b": {"name": "B"},
            "c": {"name": "C"}
        }
    })
}

fn active_document(state: &JsonState) -> HistoryKey {
    state
        .get("/activeDocument")
        .and_then(Value::as_str)
        .map(HistoryKey::from)
        .unwrap_or_default()
}

fn documents() -> OnReducer {
    OnReducer::new(documents_initial())
        .on(&["selectDocument"], |draft, action| {
            draft.set("/activeDocument", action.get_str("id").unwrap_or("a"))
        })
        .on(&["nameChange"], |draft, action| {
            let active = draft.get_str("/activeDocument").unwrap_or("a").to_string();
            let name = action.get_str("name").unwrap_or_default();
            draft.set(&format!("/documents/{active}/name"), name)
        })
        .on(&["nameChangeForDoc"], |draft, action| {
            let target = action.get_str("targetDocument").unwrap_or("a");
            let name = action.get_str("name").unwrap_or_default();
            draft.set(&format!("/documents/{target}/name"), name)
        })
}

fn documents_config() -> UndoRedoConfig {
    UndoRedoConfig::new()
        .allow(["nameChange", "nameChangeForDoc"])
        .segmentation_override(|action| action.get_str("targetDocument").map(HistoryKey::from))
}

fn segmented(config: UndoRedoConfig) -> JsonUndoRedo {
    documents().wrap_segmented(config, active_document)
}

fn select(id: &str) -> Action {
    Action::new("selectDocument").with("id", id)
}

fn rename(name: &str) -> Action {
    Action::new("nameChange").with("name", name)
}

fn rename_doc(target: &str, name: &str) -> Action {
    Action::new("nameChangeForDoc")
        .with("targetDocument", target)
        .with("name", name)
}

fn name<'s>(state: &'s JsonState, doc: &str) -> Option<&'s str> {
    state
        .get(&format!("/documents/{doc}/name"))
        .and_then(Value::as_str)
}

#[test]
fn test_streams_follow_active_document() {
    let wrapped = segmented(documents_config());
    let state = run(
        &wrapped,
        start(&wrapped),
        &[rename("A1"), select("b"), rename("B1"), undo()],
    );
    assert_eq!(name(&state, "a"), Some("A1"));
    assert_eq!(name(&state, "b"), Some("B"));

    let state = run(&wrapped, state, &[select("a"), undo()]);
    assert_eq!(name(&state, "a"), Some("A"));

    let selectors = wrapped.selectors();
    assert!(selectors.can_redo(&state, Some(&HistoryKey::from("a"))));
    assert!(selectors.can_redo(&state, Some(&HistoryKey::from("b"))));
    assert!(!selectors.can_undo(&state, None));
}

#[test]
fn test_override_routes_to_target_stream() {
    let wrapped = segmented(documents_config());
    let state = run(&wrapped, start(&wrapped), &[rename_doc("c", "C1")]);

    assert!(state.histories.contains(&HistoryKey::from("c")));
    assert!(!state.histories.contains(&HistoryKey::from("a")));

    // the active stream ("a") has nothing to undo
    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(name(&state, "c"), Some("C1"));

    // control actions honour the override too
    let state = wrapped.reduce(Some(state), &undo().with("targetDocument", "c"));
    assert_eq!(name(&state, "c"), Some("C"));
}

#[test]
fn test_stream_key_resolved_before_action() {
    // every kind is undoable here, including document selection
    let config = UndoRedoConfig::new()
        .segmentation_override(|action| action.get_str("targetDocument").map(HistoryKey::from));
    let wrapped = segmented(config);
    let state = run(&wrapped, start(&wrapped), &[select("b")]);

    // recorded in the stream that was active when the action arrived
    assert!(state.histories.contains(&HistoryKey::from("a")));
    assert!(!state.histories.contains(&HistoryKey::from("b")));

    let state = wrapped.reduce(Some(state), &undo());
    assert_eq!(state.data["activeDocument"], "b");

    let state = wrapped.reduce(Some(state), &undo().with("targetDocument", "a"));
    assert_eq!(state.data["activeDocument"], "a");
}

#[test]
fn test_clear_resets_only_active_stream() {
    let wrapped = segmented(documents_config());
    let state = run(
        &wrapped,
        start(&wrapped),
        &[
            rename("A1"),
            Action::new("BREAK_MERGE"),
            select("b"),
            rename("B1"),
            Action::new("BREAK_MERGE"),
        ],
    );
    let b = HistoryKey::from("b");
    assert!(state.histories.get(&b).unwrap().merge_broken);

    let state = wrapped.reduce(Some(state), &Action::new("CLEAR"));
    // clearing history leaves the document alone
    assert_eq!(name(&state, "b"), Some("B1"));
    let cleared = state.histories.get(&b).unwrap();
    assert!(cleared.undoable.is_empty());
    assert!(cleared.undone.is_empty());
    assert!(!cleared.merge_broken);

    // the other stream keeps its break and its step
    let other = state.histories.get(&HistoryKey::from("a")).unwrap();
    assert!(other.merge_broken);
    assert!(other.can_undo());

    let selectors = wrapped.selectors();
    assert!(!selectors.can_undo(&state, None));
    assert_eq!(wrapped.reduce(Some(state.clone()), &undo()), state);
}

// ── Selectors ──────────────────────────────────────────────────────────

#[test]
fn test_default_selectors() {
    let wrapped = todos().wrap(UndoRedoConfig::new());
    let selectors: HistorySelectors<JsonState> = HistorySelectors::new();
    let state = start(&wrapped);
    assert!(selectors.history(&state, None).is_none());
    assert!(!selectors.can_undo(&state, None));

    let state = run(&wrapped, state, &[add("a")]);
    assert_eq!(selectors.active_key(&state), HistoryKey::default());
    assert!(selectors.can_undo(&state, None));
    assert!(!selectors.can_redo(&state, None));
    assert!(selectors
        .history(&state, Some(&HistoryKey::from("missing")))
        .is_none());

    let state = wrapped.reduce(Some(state), &undo());
    assert!(!selectors.can_undo(&state, None));
    assert!(selectors.can_redo(&state, None));
}

#[test]
fn test_segmented_selectors_track_active_key() {
    let wrapped = segmented(documents_config());
    let selectors = HistorySelectors::segmented(active_document);
    let state = run(&wrapped, start(&wrapped), &[rename("A1"), select("b")]);

    assert_eq!(selectors.active_key(&state), HistoryKey::from("b"));
    assert!(!selectors.can_undo(&state, None));
    assert!(selectors.can_undo(&state, Some(&HistoryKey::from("a"))));
    assert_eq!(
        wrapped.selectors().active_key(&state),
        selectors.active_key(&state)
    );
}

#[test]
fn test_history_travels_with_state() {
    let wrapped = todos().wrap(UndoRedoConfig::new().track_payload(true));
    let state = run(&wrapped, start(&wrapped), &[add("a"), add("b"), undo()]);

    let json = serde_json::to_string(&state).unwrap();
    let restored: JsonState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, state);

    // a restored state keeps undoing and redoing
    let restored = wrapped.reduce(Some(restored), &redo());
    assert_eq!(ids(&restored), vec!["a", "b"]);
}
