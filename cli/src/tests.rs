use super::*;

#[test]
fn parses_install_with_scope() {
    let cli = Cli::try_parse_from(["fontctl", "install", "-s", "Demo.ttf"]).expect("parse cli");
    assert!(!cli.debug);
    let Command::Install(args) = cli.command else {
        panic!("expected install");
    };
    assert!(args.systemwide);
    assert_eq!(args.font.file, PathBuf::from("Demo.ttf"));
}

#[test]
fn debug_flag_is_global() {
    let cli = Cli::try_parse_from(["fontctl", "getname", "Demo.ttf", "--debug"]).expect("parse cli");
    assert!(cli.debug);

    let cli = Cli::try_parse_from(["fontctl", "-d", "refresh"]).expect("parse cli");
    assert!(cli.debug);
    assert!(matches!(cli.command, Command::Refresh));
}

#[test]
fn uninstall_defaults_to_user_scope_without_verify() {
    let cli = Cli::try_parse_from(["fontctl", "uninstall", "Demo.ttf"]).expect("parse cli");
    let Command::Uninstall(args) = cli.command else {
        panic!("expected uninstall");
    };
    assert!(!args.target.systemwide);
    assert!(!args.verify);
    assert_eq!(Scope::from_systemwide(args.target.systemwide), Scope::User);

    let cli = Cli::try_parse_from(["fontctl", "uninstall", "--systemwide", "--verify", "Demo.ttf"])
        .expect("parse cli");
    let Command::Uninstall(args) = cli.command else {
        panic!("expected uninstall");
    };
    assert!(args.target.systemwide);
    assert!(args.verify);
}

#[test]
fn file_commands_require_a_path() {
    for command in ["install", "uninstall", "getname", "load", "unload"] {
        assert!(
            Cli::try_parse_from(["fontctl", command]).is_err(),
            "{command} accepted no file"
        );
    }
    assert!(Cli::try_parse_from(["fontctl"]).is_err());
}

#[test]
fn preview_font_parses_style_case_insensitively() {
    let cli = Cli::try_parse_from(["fontctl", "preview", "font", "Segoe UI", "Bold-Italic"])
        .expect("parse cli");
    let Command::Preview(PreviewCommand::Font(args)) = cli.command else {
        panic!("expected preview font");
    };
    assert_eq!(args.name, "Segoe UI");
    assert_eq!(args.style, FontStyle::BoldItalic);
}

#[test]
fn preview_font_requires_a_style() {
    let err = Cli::try_parse_from(["fontctl", "preview", "font", "Arial"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    assert_eq!(usage_exit_code(&err), 1);
}

#[test]
fn usage_errors_exit_with_one() {
    for args in [
        vec!["fontctl"],
        vec!["fontctl", "install"],
        vec!["fontctl", "bogus"],
        vec!["fontctl", "install", "-x", "Demo.ttf"],
    ] {
        let err = Cli::try_parse_from(args.iter().copied()).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1, "{args:?}");
    }
}

#[test]
fn help_and_version_exit_with_zero() {
    for flag in ["--help", "--version"] {
        let err = Cli::try_parse_from(["fontctl", flag]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0, "{flag}");
    }
}

#[test]
fn preview_font_rejects_unknown_style() {
    let parse = Cli::try_parse_from(["fontctl", "preview", "font", "Arial", "oblique"]);
    assert!(parse.is_err());
}

#[test]
fn preview_file_takes_a_path() {
    let cli = Cli::try_parse_from(["fontctl", "preview", "file", "Demo.otf"]).expect("parse cli");
    let Command::Preview(PreviewCommand::File(args)) = cli.command else {
        panic!("expected preview file");
    };
    assert_eq!(args.file, PathBuf::from("Demo.otf"));
}

#[test]
fn mddocs_is_hidden_but_callable() {
    let cmd = Cli::command();
    let mddocs = cmd.find_subcommand("mddocs").expect("mddocs exists");
    assert!(mddocs.is_hide_set());
    assert!(Cli::try_parse_from(["fontctl", "mddocs"]).is_ok());
}

#[test]
fn markdown_docs_cover_visible_commands() {
    let docs = markdown_docs().expect("render docs");
    assert!(docs.starts_with("# fontctl\n"));
    for heading in [
        "## fontctl install",
        "## fontctl uninstall",
        "## fontctl getname",
        "## fontctl refresh",
        "### fontctl preview font",
    ] {
        assert!(docs.contains(heading), "missing {heading}");
    }
    assert!(docs.contains("`-s, --systemwide`"));
    assert!(docs.contains("`--verify`"));
    assert!(docs.contains("bold-italic"));
    assert!(!docs.contains("mddocs"));
}

#[cfg(not(windows))]
#[test]
fn state_changing_commands_need_windows() {
    let err = require_windows("load").unwrap_err();
    assert!(err.to_string().contains("only works on MS Windows"));
}
