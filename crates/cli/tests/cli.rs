use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", std::env::temp_dir().join("bookshelf-cli-no-config"))
        .env_remove("BOOKSHELF_ENV")
        .env_remove("DATABASE_URL");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").assert().success().get_output().stdout.clone();
    let help = String::from_utf8(output).unwrap();

    for subcommand in ["serve", "migrate", "settings"] {
        assert!(help.contains(subcommand), "missing {subcommand} in:\n{help}");
    }
}

#[test]
fn settings_prints_defaults_with_env_overrides() {
    let output = cli()
        .arg("settings")
        .env("BOOKSHELF_SERVER__PORT", "9191")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let printed = String::from_utf8(output).unwrap();

    assert!(printed.contains("port: 9191"), "{printed}");
    assert!(printed.contains("max_connections: 5"), "{printed}");
}

#[test]
fn unknown_subcommand_fails() {
    cli().arg("frobnicate").assert().failure();
}
