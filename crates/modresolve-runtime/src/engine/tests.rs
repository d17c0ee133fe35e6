use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier, OnceLock, Weak};

use mockall::mock;
use modresolve_core::ports::{MemorySink, MockFs};
use modresolve_core::{
    DEFAULT_OWN_NAMESPACE, ExclusionRules, FixedPathProvider, FsProvider, HandlerId, HostLoader,
    ModuleRequest, ProbeOutcome, ResolveHandler,
};

use super::*;
use crate::host::ModuleHost;

mock! {
    pub StrictFs {}
    impl FsProvider for StrictFs {
        fn check_file(&self, path: &Path) -> ProbeOutcome;
    }
}

mock! {
    pub Host {}
    impl HostLoader for Host {
        fn attach(&self, handler: Arc<dyn ResolveHandler>) -> HandlerId;
        fn detach(&self, id: HandlerId) -> bool;
    }
}

fn host() -> Arc<ModuleHost> {
    Arc::new(ModuleHost::new("dll"))
}

fn engine(fs: Arc<dyn FsProvider>, system: &[&str]) -> ResolutionEngine {
    ResolutionEngine::builder(host())
        .system_paths(Arc::new(FixedPathProvider::new(system.iter().copied())))
        .filesystem(fs)
        .module_extension("dll")
        .exclusion_rules(ExclusionRules::with_defaults(DEFAULT_OWN_NAMESPACE).unwrap())
        .build()
}

fn activate(engine: &ResolutionEngine, sink: &Arc<MemorySink>, user: &[&str]) {
    engine
        .activate(
            ActivationOptions::new()
                .with_sink(Arc::clone(sink) as SharedLogSink)
                .with_probing_paths(user.iter().copied()),
        )
        .unwrap();
}

fn probed(sink: &MemorySink) -> Vec<String> {
    sink.lines_containing("Probing")
}

#[test]
fn test_user_path_match_after_probing_system_paths_in_order() {
    let fs = Arc::new(MockFs::new().with_file("/u1/Vendor.Tools.dll"));
    let engine = engine(fs, &["/s1", "/s2"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let resolved = engine.try_resolve(&ModuleRequest::new(
        "Vendor.Tools, Version=1.0.0.0, Culture=neutral",
    ));

    assert_eq!(resolved, Some(PathBuf::from("/u1/Vendor.Tools.dll")));
    assert_eq!(
        probed(&sink),
        [
            "   Probing '/s1/Vendor.Tools.dll'.",
            "   Probing '/s2/Vendor.Tools.dll'.",
            "   Probing '/u1/Vendor.Tools.dll'.",
        ]
    );
    assert_eq!(
        sink.lines_containing("Resolved"),
        ["   Resolved module '/u1/Vendor.Tools.dll'."]
    );
}

#[test]
fn test_system_paths_take_precedence() {
    let fs = Arc::new(
        MockFs::new()
            .with_file("/s1/Vendor.Tools.dll")
            .with_file("/u1/Vendor.Tools.dll"),
    );
    let engine = engine(fs, &["/s1", "/s2"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let resolved = engine.try_resolve(&ModuleRequest::new("Vendor.Tools"));

    assert_eq!(resolved, Some(PathBuf::from("/s1/Vendor.Tools.dll")));
    assert_eq!(probed(&sink).len(), 1);
}

#[test]
fn test_miss_is_logged_and_returns_no_opinion() {
    let engine = engine(Arc::new(MockFs::new()), &["/s1"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let report = engine.resolve(&ModuleRequest::new("Vendor.Missing, Version=2.0"));

    assert_eq!(report.resolution, Resolution::NotFound);
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(
        sink.lines_containing("Could not resolve"),
        ["   Could not resolve module 'Vendor.Missing, Version=2.0'."]
    );
    assert!(!engine.is_resolving("Vendor.Missing, Version=2.0"));
}

#[test]
fn test_excluded_module_is_never_probed() {
    let mut fs = MockStrictFs::new();
    fs.expect_check_file().never();
    let engine = engine(Arc::new(fs), &["/s1"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    for name in [
        "Microsoft.BizTalk.ExplorerOM.resources, Version=3.0.1.0, Culture=fr",
        "Microsoft.ServiceModel.Channels.XmlSerializers, Version=3.0.1.0",
        "Be.Stateless.BizTalk.Dsl.XmlSerializers, Version=2.0.0.0",
    ] {
        let report = engine.resolve(&ModuleRequest::new(name));
        assert!(matches!(report.resolution, Resolution::Excluded { .. }), "{name}");
        assert!(report.attempts.is_empty());
    }
    assert!(probed(&sink).is_empty());
    assert!(sink.lines_containing("Could not resolve").is_empty());
}

#[test]
fn test_satellites_skipped_only_when_requested() {
    let fs = Arc::new(MockFs::new().with_file("/u1/Vendor.Tools.resources.dll"));
    let request = ModuleRequest::new("Vendor.Tools.resources, Version=1.0, Culture=fr-BE");

    let skipping = engine(fs.clone(), &[]);
    skipping
        .activate(
            ActivationOptions::new()
                .skip_satellite_modules(true)
                .with_probing_paths(["/u1"]),
        )
        .unwrap();
    assert_eq!(
        skipping.resolve(&request).resolution,
        Resolution::SatelliteSkipped
    );

    let probing = engine(fs, &[]);
    probing
        .activate(ActivationOptions::new().with_probing_paths(["/u1"]))
        .unwrap();
    assert_eq!(
        probing.try_resolve(&request),
        Some(PathBuf::from("/u1/Vendor.Tools.resources.dll"))
    );
}

/// Filesystem that re-enters the engine for the same name while probing.
struct ReentrantFs {
    engine: OnceLock<Weak<ResolutionEngine>>,
    nested: std::sync::Mutex<Vec<Option<PathBuf>>>,
}

impl FsProvider for ReentrantFs {
    fn check_file(&self, path: &Path) -> ProbeOutcome {
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            assert!(engine.is_resolving("Vendor.Loop"));
            let nested = engine.try_resolve(&ModuleRequest::new("Vendor.Loop"));
            self.nested.lock().unwrap().push(nested);
        }
        if path == Path::new("/u1/Vendor.Loop.dll") {
            ProbeOutcome::Found
        } else {
            ProbeOutcome::NotFound
        }
    }
}

#[test]
fn test_reentrant_request_short_circuits_and_guard_is_released() {
    let fs = Arc::new(ReentrantFs {
        engine: OnceLock::new(),
        nested: std::sync::Mutex::new(Vec::new()),
    });
    let engine = Arc::new(engine(fs.clone(), &[]));
    fs.engine.set(Arc::downgrade(&engine)).unwrap();
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let resolved = engine.try_resolve(&ModuleRequest::new("Vendor.Loop"));

    assert_eq!(resolved, Some(PathBuf::from("/u1/Vendor.Loop.dll")));
    // The nested request never probed: exactly one probe line for one directory
    assert_eq!(probed(&sink).len(), 1);
    assert_eq!(fs.nested.lock().unwrap().as_slice(), [None]);
    assert!(!engine.is_resolving("Vendor.Loop"));
}

#[test]
fn test_concurrent_same_name_requests_both_probe() {
    struct RendezvousFs(Barrier);
    impl FsProvider for RendezvousFs {
        fn check_file(&self, _path: &Path) -> ProbeOutcome {
            // Both threads must be probing at the same time to get past this
            self.0.wait();
            ProbeOutcome::Found
        }
    }

    let engine = Arc::new(engine(Arc::new(RendezvousFs(Barrier::new(2))), &[]));
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.try_resolve(&ModuleRequest::new("Vendor.Shared")))
        })
        .collect();
    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            Some(PathBuf::from("/u1/Vendor.Shared.dll"))
        );
    }

    assert_eq!(probed(&sink).len(), 2);
    assert!(!engine.is_resolving("Vendor.Shared"));
}

#[test]
fn test_probe_panic_is_contained_and_releases_guard() {
    struct FlakyFs;
    impl FsProvider for FlakyFs {
        fn check_file(&self, path: &Path) -> ProbeOutcome {
            assert!(!path.starts_with("/s1"), "transient failure");
            ProbeOutcome::Found
        }
    }

    let engine = engine(Arc::new(FlakyFs), &["/s1"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let resolved = engine.try_resolve(&ModuleRequest::new("Vendor.Tools"));

    assert_eq!(resolved, Some(PathBuf::from("/u1/Vendor.Tools.dll")));
    assert_eq!(probed(&sink).len(), 2);
    assert!(!engine.is_resolving("Vendor.Tools"));
}

#[test]
fn test_requester_is_logged() {
    let engine = engine(Arc::new(MockFs::new()), &[]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &[]);

    engine.try_resolve(&ModuleRequest::new("Vendor.Dep").requested_by("Vendor.App"));

    assert_eq!(
        sink.lines_containing("Resolving dependencies"),
        ["Resolving dependencies of 'Vendor.App'."]
    );
}

#[test]
fn test_missing_system_paths_reported_once() {
    let engine = engine(Arc::new(MockFs::new()), &[]);
    let sink = Arc::new(MemorySink::new());

    activate(&engine, &sink, &[]);
    engine.deactivate();
    activate(&engine, &sink, &[]);

    assert_eq!(
        sink.lines_containing(MISSING_SYSTEM_PATHS_MESSAGE).len(),
        1
    );
}

#[test]
fn test_present_system_paths_are_not_reported() {
    let engine = engine(Arc::new(MockFs::new()), &["/s1"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &[]);

    assert!(sink.lines().is_empty());
}

#[test]
fn test_activation_lifecycle_against_host() {
    let mut host = MockHost::new();
    host.expect_attach()
        .times(1)
        .returning(|_| HandlerId::new(42));
    host.expect_detach()
        .withf(|id| *id == HandlerId::new(42))
        .times(1)
        .returning(|_| true);

    let engine = ResolutionEngine::builder(Arc::new(host)).build();
    assert_eq!(engine.state(), EngineState::Inactive);
    assert!(!engine.deactivate());

    engine.activate(ActivationOptions::new()).unwrap();
    assert_eq!(engine.state(), EngineState::Active(HandlerId::new(42)));

    assert_eq!(
        engine.activate(ActivationOptions::new()),
        Err(EngineError::AlreadyActive(HandlerId::new(42)))
    );

    assert!(engine.deactivate());
    assert!(!engine.is_active());
    assert!(!engine.deactivate());
}

#[test]
fn test_drop_detaches_active_engine() {
    let mut host = MockHost::new();
    host.expect_attach().returning(|_| HandlerId::new(1));
    host.expect_detach().times(1).returning(|_| true);

    let engine = ResolutionEngine::builder(Arc::new(host)).build();
    engine.activate(ActivationOptions::new()).unwrap();
    drop(engine);
}

#[test]
fn test_inactive_engine_has_no_opinion() {
    let mut fs = MockStrictFs::new();
    fs.expect_check_file().never();
    let engine = engine(Arc::new(fs), &["/s1"]);

    assert_eq!(
        engine.resolve(&ModuleRequest::new("Vendor.Tools")).resolution,
        Resolution::Inactive
    );
}

#[test]
fn test_paths_added_after_activation_are_probed() {
    let fs = Arc::new(MockFs::new().with_file("/late/Vendor.Tools.dll"));
    let engine = engine(fs, &[]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    assert_eq!(engine.try_resolve(&ModuleRequest::new("Vendor.Tools")), None);

    engine.add_paths(["/u1; /late ;"]);

    assert_eq!(
        engine.try_resolve(&ModuleRequest::new("Vendor.Tools")),
        Some(PathBuf::from("/late/Vendor.Tools.dll"))
    );
    assert_eq!(&*engine.user_paths(), ["/u1".to_string(), "/late".to_string()]);
}

#[test]
fn test_search_list_collapses_duplicates_across_sources() {
    let engine = engine(Arc::new(MockFs::new()), &["/s1", "/s2"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/s2;/u1", "/u1;/s1"]);

    assert_eq!(
        &*engine.search_list(),
        [
            PathBuf::from("/s1"),
            PathBuf::from("/s2"),
            PathBuf::from("/u1")
        ]
    );
}

#[test]
fn test_exclusion_rules_can_be_replaced() {
    let fs = Arc::new(MockFs::new().with_file("/u1/Be.Stateless.Dsl.resources.dll"));
    let engine = engine(fs, &[]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let request = ModuleRequest::new("Be.Stateless.Dsl.resources");
    assert_eq!(engine.try_resolve(&request), None);

    engine.set_exclusion_rules(ExclusionRules::none());
    assert!(engine.exclusion_rules().is_empty());
    assert_eq!(
        engine.try_resolve(&request),
        Some(PathBuf::from("/u1/Be.Stateless.Dsl.resources.dll"))
    );
}

#[test]
fn test_plain_builder_excludes_known_absent_satellites() {
    let mut fs = MockStrictFs::new();
    fs.expect_check_file().never();
    let engine = ResolutionEngine::builder(host())
        .filesystem(Arc::new(fs))
        .build();
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    let report = engine.resolve(&ModuleRequest::new(
        "Microsoft.BizTalk.ExplorerOM.resources, Version=3.0.1.0, Culture=fr",
    ));

    assert!(matches!(report.resolution, Resolution::Excluded { .. }));
    assert!(report.attempts.is_empty());
    assert!(probed(&sink).is_empty());
}

#[test]
fn test_names_escaping_the_search_directories_are_not_probed() {
    let mut fs = MockStrictFs::new();
    fs.expect_check_file().never();
    let engine = engine(Arc::new(fs), &["/s1"]);
    let sink = Arc::new(MemorySink::new());
    activate(&engine, &sink, &["/u1"]);

    for name in [
        "/etc/evil, Version=1.0",
        "../outside/x",
        r"..\outside\x",
        ", Version=1.0",
        "..",
    ] {
        let report = engine.resolve(&ModuleRequest::new(name));
        assert_eq!(report.resolution, Resolution::InvalidName, "{name}");
        assert!(report.attempts.is_empty());
        assert!(!engine.is_resolving(name));
    }
    assert!(probed(&sink).is_empty());
    assert!(sink.lines_containing("Could not resolve").is_empty());
}
