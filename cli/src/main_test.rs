use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("session-cli").chain(args.iter().copied())).unwrap()
}

#[test]
fn login_takes_email_and_password() {
    let cli = parse(&["login", "--email", "a@example.com", "--password", "pw"]);
    assert!(matches!(cli.command, Command::Login { ref email, ref password } if email == "a@example.com" && password == "pw"));
}

#[test]
fn provider_is_parsed_case_insensitively() {
    let cli = parse(&["provider-login", "--provider", "Google", "--token", "t"]);
    assert!(matches!(cli.command, Command::ProviderLogin { provider: Provider::Google, .. }));
}

#[test]
fn unknown_provider_is_rejected() {
    let result = Cli::try_parse_from(["session-cli", "provider-login", "--provider", "github", "--token", "t"]);
    assert!(result.is_err());
}

#[test]
fn state_file_flag_overrides_default() {
    let cli = parse(&["--state-file", "/tmp/s.json", "status"]);
    assert_eq!(cli.state_file, PathBuf::from("/tmp/s.json"));
}

#[test]
fn update_builds_patch_from_given_fields() {
    let cli = parse(&["users", "update", "u-2", "--name", "New", "--role", "ADMIN", "--role", "USER"]);
    let Command::Users(UsersCommand { command: UsersSubcommand::Update(args) }) = cli.command else {
        panic!("expected users update");
    };
    let (id, patch) = args.into_patch().unwrap();
    assert_eq!(id, "u-2");
    assert_eq!(patch.name.as_deref(), Some("New"));
    assert_eq!(patch.roles, Some(["ADMIN".to_owned(), "USER".to_owned()].into_iter().collect()));
    assert_eq!(patch.email, None);
}

#[test]
fn update_without_fields_is_an_error() {
    let cli = parse(&["users", "update", "u-2"]);
    let Command::Users(UsersCommand { command: UsersSubcommand::Update(args) }) = cli.command else {
        panic!("expected users update");
    };
    assert!(matches!(args.into_patch(), Err(CliError::EmptyPatch)));
}

#[test]
fn empty_base_url_flag_is_a_config_error() {
    let cli = parse(&["--base-url", "", "status"]);
    let err = load_config(cli.base_url.as_deref()).unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::Empty { ref var }) if var == "SESSION_API_URL"));
}

#[test]
fn base_url_flag_drops_trailing_slash() {
    let config = load_config(Some("http://h.test/api/")).unwrap();
    assert_eq!(config.api_base_url, "http://h.test/api");
}
