use super::*;

#[test]
fn defaults_use_local_store_and_last_write_wins() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(matches!(
        settings.store.backend,
        StoreBackend::Local { ref root } if root == std::path::Path::new(DEFAULT_LOCAL_ROOT)
    ));
    assert_eq!(settings.store.write_mode, WriteMode::Overwrite);
    assert!(settings.store.request_timeout.is_none());
    assert_eq!(settings.content.projects_path, "data/projects.json");
    assert_eq!(settings.content.blogs_path, "data/blogs.json");
    assert_eq!(
        settings.mirror.directory.as_deref(),
        Some(std::path::Path::new(DEFAULT_MIRROR_DIR))
    );
    assert!(settings.admin.secret.is_empty());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.store.write_mode = Some("overwrite".to_string());

    let overrides = GlobalOverrides {
        log_level: Some("debug".to_string()),
        write_mode: Some("check-revision".to_string()),
        admin_secret: Some("from-cli".to_string()),
        ..Default::default()
    };

    raw.apply_global_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.store.write_mode, WriteMode::CheckRevision);
    assert_eq!(settings.admin.secret, "from-cli");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = GlobalOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_global_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn github_backend_requires_owner_and_repo() {
    let mut raw = RawSettings::default();
    raw.store.backend = Some("github".to_string());
    raw.store.owner = Some("alice".to_string());

    let err = Settings::from_raw(raw).expect_err("missing repo");
    assert!(matches!(err, LoadError::Invalid { key: "store.repo", .. }));
}

#[test]
fn github_backend_resolves_defaults() {
    let mut raw = RawSettings::default();
    raw.store.backend = Some("GitHub".to_string());
    raw.store.owner = Some("alice".to_string());
    raw.store.repo = Some("site".to_string());
    raw.store.branch = Some("  ".to_string());
    raw.store.request_timeout_seconds = Some(15);

    let settings = Settings::from_raw(raw).expect("valid settings");
    match settings.store.backend {
        StoreBackend::GitHub(github) => {
            assert_eq!(github.api_base.as_str(), "https://api.github.com/");
            assert_eq!(github.branch, None);
            assert_eq!(github.token, None);
        }
        other => panic!("unexpected backend {other:?}"),
    }
    assert_eq!(settings.store.request_timeout, Some(Duration::from_secs(15)));
}

#[test]
fn unknown_backend_and_write_mode_are_rejected() {
    let mut raw = RawSettings::default();
    raw.store.backend = Some("s3".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "store.backend",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.store.write_mode = Some("sometimes".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "store.write_mode",
            ..
        })
    ));
}

#[test]
fn content_paths_must_stay_inside_the_repository() {
    for bad in ["/etc/projects.json", "../projects.json", "data//projects.json"] {
        let mut raw = RawSettings::default();
        raw.content.projects_path = Some(bad.to_string());
        assert!(
            Settings::from_raw(raw).is_err(),
            "{bad} should be rejected"
        );
    }

    let mut raw = RawSettings::default();
    raw.content.blogs_path = Some("data/projects.json".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn disabled_mirror_has_no_directory() {
    let mut raw = RawSettings::default();
    raw.mirror.enabled = Some(false);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.mirror.directory.is_none());
}

#[test]
fn assistant_limits_are_validated() {
    let mut raw = RawSettings::default();
    raw.assistant.max_tokens = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "assistant.max_tokens",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.assistant.api_key = Some("  sk-abc ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.assistant.api_key.as_deref(), Some("sk-abc"));
    assert_eq!(settings.assistant.max_tokens.get(), DEFAULT_CHAT_MAX_TOKENS);
    assert_eq!(settings.assistant.history_turns, DEFAULT_HISTORY_TURNS);
}

#[test]
fn parse_project_save_arguments() {
    let args = CliArgs::parse_from([
        "folio",
        "--store-backend",
        "memory",
        "projects",
        "save",
        "--title",
        "Demo",
        "--tag",
        "rust",
        "--tag",
        "cli",
        "--featured",
        "yes",
    ]);

    assert_eq!(args.overrides.store_backend.as_deref(), Some("memory"));
    match args.command {
        Command::Projects(ProjectsArgs {
            action: ProjectAction::Save(fields),
        }) => {
            assert_eq!(fields.id, None);
            assert_eq!(fields.title.as_deref(), Some("Demo"));
            assert_eq!(fields.tags, ["rust", "cli"]);
            assert_eq!(fields.featured, Some(true));
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

#[test]
fn parse_blog_remove_with_global_flag_after_subcommand() {
    let args = CliArgs::parse_from([
        "folio",
        "blogs",
        "remove",
        "7",
        "--yes",
        "--write-mode",
        "check_revision",
    ]);

    assert_eq!(args.overrides.write_mode.as_deref(), Some("check_revision"));
    match args.command {
        Command::Blogs(BlogsArgs {
            action: BlogAction::Remove(remove),
        }) => {
            assert_eq!(remove.id, 7);
            assert!(remove.yes);
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}
