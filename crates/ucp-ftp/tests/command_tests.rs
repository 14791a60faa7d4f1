//! End-to-end command execution tests against a scripted transport and
//! a recording interaction handler.

use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

use ucp_core::credentials::{CredentialKey, CredentialStore};
use ucp_core::interaction::{
    AuthenticationRequest, AuthenticationSelection, Environment, InteractionHandler,
    NameClashRequest, NameClashSelection,
};
use ucp_core::properties::{
    property_attribute, ContentInfo, PropertiesChangeListener, Property, PropertyChangeEvent,
    PropertyErrorKind, PropertyValue, PropertyValueType,
};

use ucp_ftp::{
    ActiveDataSink, Command, CommandArgument, CommandErrorKind, CommandOutcome, Direntry,
    DirentryKind, FtpContent, FtpContentProvider, FtpUrl, InsertArgument, OpenArgument, OpenMode,
    OpenSink, OutputStream, ProviderConfig, SinkError, Transport, TransportError, TransportResult,
    CMD_DELETE, FTP_FILE, FTP_FOLDER,
};

// ─── Scripted transport ──────────────────────────────────────────────

#[derive(Default)]
struct MockTransport {
    /// Snapshot served by `direntry`.
    entry: Mutex<Option<Direntry>>,
    /// Children served by `list`.
    entries: Mutex<Vec<Direntry>>,
    /// Document bytes served by `open`.
    payload: Mutex<Vec<u8>>,
    /// When set, `store`/`mkdir` without replace report a clash.
    target_exists: Mutex<bool>,
    /// Errors consumed (front first) by the next transport calls.
    fail_next: Mutex<VecDeque<TransportError>>,
    /// Method-name call log.
    calls: Mutex<Vec<String>>,
    /// Replace flag of each `store`/`mkdir` attempt.
    replace_flags: Mutex<Vec<bool>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_payload(payload: Vec<u8>) -> Arc<Self> {
        let t = Self::new();
        *t.payload.lock().unwrap() = payload;
        t
    }

    fn push_failure(&self, e: TransportError) {
        self.fail_next.lock().unwrap().push_back(e);
    }

    fn set_entry(&self, entry: Direntry) {
        *self.entry.lock().unwrap() = Some(entry);
    }

    fn set_entries(&self, entries: Vec<Direntry>) {
        *self.entries.lock().unwrap() = entries;
    }

    fn set_target_exists(&self, exists: bool) {
        *self.target_exists.lock().unwrap() = exists;
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn replace_flags(&self) -> Vec<bool> {
        self.replace_flags.lock().unwrap().clone()
    }

    fn log(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn take_failure(&self) -> Option<TransportError> {
        self.fail_next.lock().unwrap().pop_front()
    }
}

fn file_entry() -> Direntry {
    Direntry {
        name: "report.txt".into(),
        kind: DirentryKind::File,
        size: 120,
        created: None,
        writable: true,
    }
}

impl Transport for MockTransport {
    fn direntry(&self, _url: &FtpUrl) -> TransportResult<Direntry> {
        self.log("direntry");
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(self.entry.lock().unwrap().clone().unwrap_or_else(file_entry))
    }

    fn list(&self, _url: &FtpUrl) -> TransportResult<Vec<Direntry>> {
        self.log("list");
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    fn open(&self, _url: &FtpUrl) -> TransportResult<Box<dyn Read + Send>> {
        self.log("open");
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(Box::new(Cursor::new(self.payload.lock().unwrap().clone())))
    }

    fn store(&self, url: &FtpUrl, replace: bool, data: &mut dyn Read) -> TransportResult<()> {
        self.log("store");
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        self.replace_flags.lock().unwrap().push(replace);
        if *self.target_exists.lock().unwrap() && !replace {
            return Err(TransportError::already_exists(url.title()));
        }
        let mut sink = Vec::new();
        data.read_to_end(&mut sink)?;
        Ok(())
    }

    fn mkdir(&self, url: &FtpUrl, replace: bool) -> TransportResult<()> {
        self.log("mkdir");
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        self.replace_flags.lock().unwrap().push(replace);
        if *self.target_exists.lock().unwrap() && !replace {
            return Err(TransportError::already_exists(url.title()));
        }
        Ok(())
    }

    fn del(&self, _url: &FtpUrl) -> TransportResult<()> {
        self.log("del");
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(())
    }

    fn rename(&self, url: &FtpUrl, _new_title: &str) -> TransportResult<String> {
        self.log("rename");
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(url.title().to_string())
    }
}

// ─── Recording handler ───────────────────────────────────────────────

struct MockHandler {
    auth_script: Mutex<VecDeque<AuthenticationSelection>>,
    auth_default: AuthenticationSelection,
    clash_script: Mutex<VecDeque<NameClashSelection>>,
    auth_prompts: Mutex<u32>,
    clash_prompts: Mutex<u32>,
}

impl MockHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            auth_script: Mutex::new(VecDeque::new()),
            auth_default: AuthenticationSelection::Abort,
            clash_script: Mutex::new(VecDeque::new()),
            auth_prompts: Mutex::new(0),
            clash_prompts: Mutex::new(0),
        })
    }

    fn always_retry() -> Arc<Self> {
        Arc::new(Self {
            auth_script: Mutex::new(VecDeque::new()),
            auth_default: AuthenticationSelection::Retry,
            clash_script: Mutex::new(VecDeque::new()),
            auth_prompts: Mutex::new(0),
            clash_prompts: Mutex::new(0),
        })
    }

    fn script_auth(&self, selection: AuthenticationSelection) {
        self.auth_script.lock().unwrap().push_back(selection);
    }

    fn script_clash(&self, selection: NameClashSelection) {
        self.clash_script.lock().unwrap().push_back(selection);
    }

    fn auth_prompts(&self) -> u32 {
        *self.auth_prompts.lock().unwrap()
    }

    fn clash_prompts(&self) -> u32 {
        *self.clash_prompts.lock().unwrap()
    }
}

impl InteractionHandler for MockHandler {
    fn handle_authentication(&self, _request: &AuthenticationRequest) -> AuthenticationSelection {
        *self.auth_prompts.lock().unwrap() += 1;
        self.auth_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.auth_default.clone())
    }

    fn handle_name_clash(&self, _request: &NameClashRequest) -> NameClashSelection {
        *self.clash_prompts.lock().unwrap() += 1;
        self.clash_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(NameClashSelection::Abort)
    }
}

// ─── Sinks ───────────────────────────────────────────────────────────

struct TakeSink {
    stream: Arc<Mutex<Option<Box<dyn Read + Send>>>>,
}

impl ActiveDataSink for TakeSink {
    fn set_input_stream(&mut self, stream: Box<dyn Read + Send>) {
        *self.stream.lock().unwrap() = Some(stream);
    }
}

struct PushSink {
    data: Arc<Mutex<Vec<u8>>>,
    chunks: Arc<Mutex<Vec<usize>>>,
    fail_all: bool,
}

impl OutputStream for PushSink {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), SinkError> {
        self.chunks.lock().unwrap().push(data.len());
        if self.fail_all {
            return Err(SinkError::BufferFull);
        }
        self.data.lock().unwrap().extend_from_slice(data);
        Ok(())
    }
}

struct RecordingListener {
    batches: Arc<Mutex<Vec<Vec<PropertyChangeEvent>>>>,
}

impl PropertiesChangeListener for RecordingListener {
    fn properties_changed(&self, events: &[PropertyChangeEvent]) {
        self.batches.lock().unwrap().push(events.to_vec());
    }
}

// ─── Fixture helpers ─────────────────────────────────────────────────

fn content_for(transport: Arc<MockTransport>, identifier: &str) -> (FtpContent, Arc<CredentialStore>) {
    let credentials = Arc::new(CredentialStore::new());
    let provider = FtpContentProvider::new(transport, credentials.clone());
    (provider.query_content(identifier).unwrap(), credentials)
}

fn prop(name: &str) -> Property {
    Property::new(name, PropertyValueType::Text, property_attribute::BOUND)
}

fn title_pairs(title: &str) -> Vec<(String, PropertyValue)> {
    vec![("Title".to_string(), PropertyValue::Text(title.to_string()))]
}

fn file_info() -> ContentInfo {
    ContentInfo::new(FTP_FILE, 0, vec![])
}

fn folder_info() -> ContentInfo {
    ContentInfo::new(FTP_FOLDER, 0, vec![])
}

// ─── getPropertyValues ───────────────────────────────────────────────

#[test]
fn test_get_property_values_one_slot_per_name() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/pub/report.txt");

    let cmd = Command::get_property_values(vec![prop("Title"), prop("Size"), prop("Bogus")]);
    let row = match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::Row(row) => row,
        other => panic!("expected row, got {:?}", other),
    };

    assert_eq!(row.len(), 3);
    assert_eq!(row.value_at(0).and_then(|v| v.as_text()), Some("report.txt"));
    assert_eq!(row.value_at(1).and_then(|v| v.as_long()), Some(120));
    assert!(row.value_at(2).unwrap().is_void());
}

#[test]
fn test_get_property_values_empty_list() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/a");
    let cmd = Command::get_property_values(vec![]);
    match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::Row(row) => assert!(row.is_empty()),
        other => panic!("expected row, got {:?}", other),
    }
}

// ─── setPropertyValues ───────────────────────────────────────────────

#[test]
fn test_set_empty_title_is_argument_error_without_rename() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");

    let cmd = Command::set_property_values(title_pairs(""));
    let results = match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::SetResults(results) => results,
        other => panic!("expected set results, got {:?}", other),
    };

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].as_ref().unwrap_err().kind,
        PropertyErrorKind::IllegalArgument
    );
    assert!(transport.calls().is_empty());
    assert_eq!(content.identifier(), "ftp://h/a.txt");
}

#[test]
fn test_set_unknown_property_no_transport_call() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");

    let cmd = Command::set_property_values(vec![(
        "FavouriteColour".to_string(),
        PropertyValue::Text("green".into()),
    )]);
    let results = match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::SetResults(results) => results,
        other => panic!("expected set results, got {:?}", other),
    };

    assert_eq!(
        results[0].as_ref().unwrap_err().kind,
        PropertyErrorKind::UnknownProperty
    );
    assert!(transport.calls().is_empty());
}

#[test]
fn test_set_declared_read_only_property() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/a.txt");

    let cmd = Command::set_property_values(vec![("Size".to_string(), PropertyValue::Long(7))]);
    let results = match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::SetResults(results) => results,
        other => panic!("expected set results, got {:?}", other),
    };
    assert_eq!(
        results[0].as_ref().unwrap_err().kind,
        PropertyErrorKind::IllegalAccess
    );
}

#[test]
fn test_set_title_wrong_type() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/a.txt");

    let cmd = Command::set_property_values(vec![("Title".to_string(), PropertyValue::Long(1))]);
    match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::SetResults(results) => assert_eq!(
            results[0].as_ref().unwrap_err().kind,
            PropertyErrorKind::IllegalType
        ),
        other => panic!("expected set results, got {:?}", other),
    }
}

#[test]
fn test_rename_updates_identifier_and_notifies_once() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport.clone(), "ftp://h/pub/a.txt");

    let batches = Arc::new(Mutex::new(Vec::new()));
    content.add_properties_change_listener(Arc::new(RecordingListener {
        batches: batches.clone(),
    }));

    let cmd = Command::set_property_values(title_pairs("b.txt"));
    let results = match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::SetResults(results) => results,
        other => panic!("expected set results, got {:?}", other),
    };

    assert!(results[0].is_ok());
    assert_eq!(transport.calls(), ["rename"]);
    assert_eq!(content.identifier(), "ftp://h/pub/b.txt");

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[0][0].name, "Title");
    assert_eq!(batches[0][0].old_value, PropertyValue::Text("a.txt".into()));
    assert_eq!(batches[0][0].new_value, PropertyValue::Text("b.txt".into()));
}

#[test]
fn test_rename_failure_is_per_slot_access_denied() {
    let transport = MockTransport::new();
    transport.push_failure(TransportError::command_rejected("550 rename refused"));
    let (content, _) = content_for(transport, "ftp://h/a.txt");

    let cmd = Command::set_property_values(title_pairs("b.txt"));
    let results = match content.execute(cmd, &Environment::none()).unwrap() {
        CommandOutcome::SetResults(results) => results,
        other => panic!("expected set results, got {:?}", other),
    };
    assert_eq!(
        results[0].as_ref().unwrap_err().kind,
        PropertyErrorKind::AccessDenied
    );
    // The failure stayed inline; the identifier is unchanged.
    assert_eq!(content.identifier(), "ftp://h/a.txt");
}

// ─── insert ──────────────────────────────────────────────────────────

fn pending_child(transport: Arc<MockTransport>, info: ContentInfo) -> FtpContent {
    let (parent, _) = content_for(transport, "ftp://h/pub");
    parent.create_new_content(&info).unwrap()
}

#[test]
fn test_insert_pending_without_title() {
    let transport = MockTransport::new();
    let content = pending_child(transport.clone(), folder_info());

    let cmd = Command::insert(InsertArgument {
        data: None,
        replace_existing: false,
    });
    let err = content.execute(cmd, &Environment::none()).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::MissingProperties);
    assert!(transport.calls().is_empty());
}

#[test]
fn test_insert_file_without_data_fails_before_transport() {
    let transport = MockTransport::new();
    let content = pending_child(transport.clone(), file_info());
    content
        .execute(
            Command::set_property_values(title_pairs("new.txt")),
            &Environment::none(),
        )
        .unwrap();

    let cmd = Command::insert(InsertArgument {
        data: None,
        replace_existing: false,
    });
    let err = content.execute(cmd, &Environment::none()).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::MissingInputStream);
    assert!(transport.calls().is_empty());
}

#[test]
fn test_insert_file_commits_pending_child() {
    let transport = MockTransport::new();
    let content = pending_child(transport.clone(), file_info());
    content
        .execute(
            Command::set_property_values(title_pairs("new.txt")),
            &Environment::none(),
        )
        .unwrap();
    assert_eq!(content.identifier(), "ftp://h/pub/new.txt");
    assert!(content.is_pending());

    let cmd = Command::insert(InsertArgument {
        data: Some(Box::new(Cursor::new(b"hello".to_vec()))),
        replace_existing: false,
    });
    content.execute(cmd, &Environment::none()).unwrap();

    assert_eq!(transport.calls(), ["store"]);
    assert!(!content.is_pending());
}

#[test]
fn test_insert_clash_denied_without_handler() {
    let transport = MockTransport::new();
    transport.set_target_exists(true);
    let content = pending_child(transport.clone(), folder_info());
    content
        .execute(
            Command::set_property_values(title_pairs("newdir")),
            &Environment::none(),
        )
        .unwrap();

    let cmd = Command::insert(InsertArgument {
        data: None,
        replace_existing: false,
    });
    let err = content.execute(cmd, &Environment::none()).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::NameClash);
    assert_eq!(transport.calls(), ["mkdir"]);
}

#[test]
fn test_insert_clash_denied_by_handler() {
    let transport = MockTransport::new();
    transport.set_target_exists(true);
    let content = pending_child(transport.clone(), folder_info());
    content
        .execute(
            Command::set_property_values(title_pairs("newdir")),
            &Environment::none(),
        )
        .unwrap();

    let handler = MockHandler::new();
    handler.script_clash(NameClashSelection::Abort);
    let env = Environment::new(handler.clone());

    let cmd = Command::insert(InsertArgument {
        data: None,
        replace_existing: false,
    });
    let err = content.execute(cmd, &env).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::NameClash);
    assert_eq!(handler.clash_prompts(), 1);
    // Denied: no second mkdir attempt, nothing created.
    assert_eq!(transport.calls(), ["mkdir"]);
}

#[test]
fn test_insert_clash_approved_retries_once_with_replace() {
    let transport = MockTransport::new();
    transport.set_target_exists(true);
    let content = pending_child(transport.clone(), folder_info());
    content
        .execute(
            Command::set_property_values(title_pairs("newdir")),
            &Environment::none(),
        )
        .unwrap();

    let handler = MockHandler::new();
    handler.script_clash(NameClashSelection::Replace);
    let env = Environment::new(handler.clone());

    let cmd = Command::insert(InsertArgument {
        data: None,
        replace_existing: false,
    });
    content.execute(cmd, &env).unwrap();

    assert_eq!(handler.clash_prompts(), 1);
    assert_eq!(transport.calls(), ["mkdir", "mkdir"]);
    assert_eq!(transport.replace_flags(), [false, true]);
    assert!(!content.is_pending());
}

// ─── authentication retry ────────────────────────────────────────────

#[test]
fn test_auth_failure_with_supplied_credentials_retries_and_succeeds() {
    let transport = MockTransport::new();
    transport.push_failure(TransportError::auth_failed("530 login incorrect"));
    let (content, credentials) = content_for(transport.clone(), "ftp://alice@h/a.txt");

    let handler = MockHandler::new();
    handler.script_auth(AuthenticationSelection::Supply {
        password: "s3cret".into(),
        account: None,
    });
    let env = Environment::new(handler.clone());

    content.execute(Command::delete(), &env).unwrap();

    assert_eq!(handler.auth_prompts(), 1);
    assert_eq!(transport.calls(), ["del", "del"]);
    let entry = credentials
        .lookup(&CredentialKey::new("h", 21, "alice"))
        .expect("credentials cached");
    assert_eq!(entry.password, "s3cret");
}

#[test]
fn test_auth_failure_without_handler_fails_immediately() {
    let transport = MockTransport::new();
    transport.push_failure(TransportError::auth_failed("530"));
    let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");

    let err = content
        .execute(Command::delete(), &Environment::none())
        .unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::InteractivelyUnresolvable);
    assert_eq!(transport.calls(), ["del"]);
}

#[test]
fn test_auth_cancelled_by_handler() {
    let transport = MockTransport::new();
    transport.push_failure(TransportError::auth_failed("530"));
    let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");

    let handler = MockHandler::new();
    handler.script_auth(AuthenticationSelection::Abort);
    let env = Environment::new(handler);

    let err = content.execute(Command::delete(), &env).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::AuthenticationCancelled);
}

#[test]
fn test_auth_retry_cap_stops_oscillation() {
    let transport = MockTransport::new();
    for _ in 0..32 {
        transport.push_failure(TransportError::auth_failed("530"));
    }
    let credentials = Arc::new(CredentialStore::new());
    let provider = FtpContentProvider::with_config(
        transport.clone(),
        credentials,
        ProviderConfig {
            max_auth_attempts: 3,
        },
    );
    let content = provider.query_content("ftp://h/a.txt").unwrap();

    let handler = MockHandler::always_retry();
    let env = Environment::new(handler.clone());

    let err = content.execute(Command::delete(), &env).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::RetryLimitReached);
    assert_eq!(handler.auth_prompts(), 3);
    // Initial attempt plus one per allowed re-authentication.
    assert_eq!(transport.calls().len(), 4);
}

// ─── terminal classifications ────────────────────────────────────────

#[test]
fn test_terminal_failures_do_not_retry() {
    let cases = [
        (
            TransportError::connection_failed("refused"),
            CommandErrorKind::ConnectFailed,
        ),
        (
            TransportError::resolve_failed("no such host"),
            CommandErrorKind::ResolveFailed,
        ),
        (
            TransportError::access_denied("550"),
            CommandErrorKind::AccessDenied,
        ),
        (
            TransportError::command_rejected("500"),
            CommandErrorKind::QuotaError,
        ),
        (
            TransportError::not_found("550 no such file"),
            CommandErrorKind::NotFound,
        ),
        (TransportError::unknown("???"), CommandErrorKind::General),
    ];

    for (failure, expected) in cases {
        let transport = MockTransport::new();
        transport.push_failure(failure);
        let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");
        let err = content
            .execute(Command::delete(), &Environment::none())
            .unwrap_err();
        assert_eq!(err.kind, expected);
        assert_eq!(transport.calls(), ["del"], "no retry for {:?}", expected);
    }
}

// ─── argument validation ─────────────────────────────────────────────

#[test]
fn test_wrong_argument_shape_is_terminal() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");

    let cmd = Command::new(CMD_DELETE, CommandArgument::Properties(vec![]));
    let err = content.execute(cmd, &Environment::none()).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::IllegalArgument);
    assert!(transport.calls().is_empty());
}

#[test]
fn test_unknown_command_name() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/a.txt");

    let cmd = Command::new("transferContent", CommandArgument::None);
    let err = content.execute(cmd, &Environment::none()).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::UnsupportedCommand);
}

// ─── delete ──────────────────────────────────────────────────────────

#[test]
fn test_delete_marks_content_deleted() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");

    content
        .execute(Command::delete(), &Environment::none())
        .unwrap();
    assert_eq!(transport.calls(), ["del"]);

    let err = content
        .execute(Command::get_property_values(vec![prop("Title")]), &Environment::none())
        .unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::NotFound);
    // No further transport traffic after the logical delete.
    assert_eq!(transport.calls(), ["del"]);
}

#[test]
fn test_untitled_pending_child_rejects_delete_and_open() {
    let transport = MockTransport::new();
    let content = pending_child(transport.clone(), file_info());

    let err = content
        .execute(Command::delete(), &Environment::none())
        .unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::MissingProperties);

    let cmd = Command::open(OpenArgument {
        mode: OpenMode::Document,
        sink: OpenSink::None,
        properties: vec![],
    });
    let err = content.execute(cmd, &Environment::none()).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::MissingProperties);
    // The locator still names the parent; nothing may reach it.
    assert!(transport.calls().is_empty());
}

// ─── open: document mode ─────────────────────────────────────────────

fn open_with_push_sink(
    payload: Vec<u8>,
    fail_all: bool,
) -> (Vec<usize>, Vec<u8>) {
    let transport = MockTransport::with_payload(payload);
    let (content, _) = content_for(transport, "ftp://h/a.bin");

    let data = Arc::new(Mutex::new(Vec::new()));
    let chunks = Arc::new(Mutex::new(Vec::new()));
    let cmd = Command::open(OpenArgument {
        mode: OpenMode::Document,
        sink: OpenSink::OutputStream(Box::new(PushSink {
            data: data.clone(),
            chunks: chunks.clone(),
            fail_all,
        })),
        properties: vec![],
    });
    content.execute(cmd, &Environment::none()).unwrap();

    let chunks = chunks.lock().unwrap().clone();
    let data = data.lock().unwrap().clone();
    (chunks, data)
}

#[test]
fn test_open_document_chunking() {
    for (len, expected_chunks) in [
        (0usize, vec![]),
        (1, vec![1]),
        (4096, vec![4096]),
        (4097, vec![4096, 1]),
        (10000, vec![4096, 4096, 1808]),
    ] {
        let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let (chunks, data) = open_with_push_sink(payload.clone(), false);
        assert_eq!(chunks, expected_chunks, "payload {}", len);
        assert_eq!(data, payload, "payload {}", len);
    }
}

#[test]
fn test_open_document_drains_despite_sink_errors() {
    let payload: Vec<u8> = vec![7u8; 10000];
    let (chunks, data) = open_with_push_sink(payload, true);
    // Every chunk was offered to the sink even though each write failed.
    assert_eq!(chunks, vec![4096, 4096, 1808]);
    assert!(data.is_empty());
}

#[test]
fn test_open_document_hands_stream_to_data_sink() {
    let transport = MockTransport::with_payload(b"document body".to_vec());
    let (content, _) = content_for(transport, "ftp://h/a.txt");

    let slot: Arc<Mutex<Option<Box<dyn Read + Send>>>> = Arc::new(Mutex::new(None));
    let cmd = Command::open(OpenArgument {
        mode: OpenMode::Document,
        sink: OpenSink::DataSink(Box::new(TakeSink {
            stream: slot.clone(),
        })),
        properties: vec![],
    });
    content.execute(cmd, &Environment::none()).unwrap();

    let mut stream = slot.lock().unwrap().take().expect("stream delivered");
    let mut body = Vec::new();
    stream.read_to_end(&mut body).unwrap();
    assert_eq!(body, b"document body");
}

#[test]
fn test_open_document_without_sink() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/a.txt");

    let cmd = Command::open(OpenArgument {
        mode: OpenMode::Document,
        sink: OpenSink::None,
        properties: vec![],
    });
    let err = content.execute(cmd, &Environment::none()).unwrap_err();
    assert_eq!(err.kind, CommandErrorKind::UnsupportedDataSink);
}

// ─── open: listing modes ─────────────────────────────────────────────

fn listing_entries() -> Vec<Direntry> {
    vec![
        Direntry {
            name: "a.txt".into(),
            kind: DirentryKind::File,
            size: 1,
            created: None,
            writable: true,
        },
        Direntry {
            name: "sub".into(),
            kind: DirentryKind::Folder,
            size: 0,
            created: None,
            writable: true,
        },
    ]
}

#[test]
fn test_open_listing_modes_filter() {
    for (mode, expected) in [
        (OpenMode::All, 2usize),
        (OpenMode::Documents, 1),
        (OpenMode::Folders, 1),
    ] {
        let transport = MockTransport::new();
        transport.set_entries(listing_entries());
        let (content, _) = content_for(transport, "ftp://h/pub");

        let cmd = Command::open(OpenArgument {
            mode,
            sink: OpenSink::None,
            properties: vec![prop("Title")],
        });
        match content.execute(cmd, &Environment::none()).unwrap() {
            CommandOutcome::ResultSet(set) => assert_eq!(set.len(), expected, "{:?}", mode),
            other => panic!("expected result set, got {:?}", other),
        }
    }
}

#[test]
fn test_open_share_modes_unsupported() {
    for mode in [
        OpenMode::DocumentShareDenyNone,
        OpenMode::DocumentShareDenyWrite,
    ] {
        let transport = MockTransport::new();
        let (content, _) = content_for(transport.clone(), "ftp://h/a.txt");
        let cmd = Command::open(OpenArgument {
            mode,
            sink: OpenSink::None,
            properties: vec![],
        });
        let err = content.execute(cmd, &Environment::none()).unwrap_err();
        assert_eq!(err.kind, CommandErrorKind::UnsupportedOpenMode);
        assert!(transport.calls().is_empty());
    }
}

// ─── createNewContent ────────────────────────────────────────────────

#[test]
fn test_create_new_content_known_kinds() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/pub");

    for info in [file_info(), folder_info()] {
        match content
            .execute(Command::create_new_content(info), &Environment::none())
            .unwrap()
        {
            CommandOutcome::Created(Some(child)) => {
                assert!(child.is_pending());
                assert_eq!(child.identifier(), "ftp://h/pub");
            }
            other => panic!("expected created content, got {:?}", other),
        }
    }
}

#[test]
fn test_create_new_content_unknown_kind() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/pub");

    let info = ContentInfo::new("application/x-unknown", 0, vec![]);
    match content
        .execute(Command::create_new_content(info), &Environment::none())
        .unwrap()
    {
        CommandOutcome::Created(None) => {}
        other => panic!("expected none, got {:?}", other),
    }
}

// ─── capability info ─────────────────────────────────────────────────

#[test]
fn test_capability_info_commands() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/a");

    match content
        .execute(Command::get_command_info(), &Environment::none())
        .unwrap()
    {
        CommandOutcome::CommandInfo(info) => {
            assert!(info.iter().any(|e| e.name == "open"));
            assert!(info.iter().any(|e| e.name == "insert"));
        }
        other => panic!("expected command info, got {:?}", other),
    }

    match content
        .execute(Command::get_property_set_info(), &Environment::none())
        .unwrap()
    {
        CommandOutcome::PropertySetInfo(props) => {
            assert!(props.iter().any(|p| p.name == "Title"));
            assert!(props.iter().any(|p| p.name == "CreatableContentsInfo"));
        }
        other => panic!("expected property set info, got {:?}", other),
    }
}

// ─── identity ────────────────────────────────────────────────────────

#[test]
fn test_parent_navigation() {
    let transport = MockTransport::new();
    let (content, _) = content_for(transport, "ftp://h/pub/a.txt");
    assert_eq!(content.parent_identifier(), "ftp://h/pub");
    assert_eq!(content.parent().identifier(), "ftp://h/pub");
    assert!(content.set_parent(&content.parent()).is_err());
}
