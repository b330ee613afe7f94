use std::fs;
use std::path::PathBuf;

use pelada::match_log::{
    Fixture, IssueKind, PlayerGoals, load_match_log, parse_match_log,
};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

#[test]
fn single_two_team_day_round_trips() {
    let text = "data: 01/02\ntimes: 2\n# time - teamA\nZico(2)\n---\n# time - teamB\nRomario(1)\n---\njogos:\nteamA 2 - 1 teamB\n";
    let log = parse_match_log(text);
    assert!(log.issues.is_empty());
    assert_eq!(log.days.len(), 1);

    let day = &log.days[0];
    assert_eq!(day.date, "01/02");
    assert_eq!(day.num_times, 2);
    assert_eq!(
        day.fixtures,
        vec![Fixture {
            team_a: "teama".to_string(),
            goals_a: 2,
            team_b: "teamb".to_string(),
            goals_b: 1,
        }]
    );
    assert_eq!(
        day.team("teama").expect("team a").players,
        vec![PlayerGoals {
            name: "zico".to_string(),
            goals: 2
        }]
    );
    assert_eq!(day.team("teamb").expect("team b").players[0].goals, 1);
}

#[test]
fn parsing_is_deterministic() {
    let text = read_fixture("jogos.txt");
    assert_eq!(parse_match_log(&text), parse_match_log(&text));
}

#[test]
fn parses_multi_day_fixture() {
    let log = parse_match_log(&read_fixture("jogos.txt"));
    assert_eq!(log.dates(), vec!["07/03/2025", "14/03/2025"]);

    let first = log.day("07/03/2025").expect("first day");
    assert_eq!(first.num_times, 2);
    assert_eq!(first.teams.len(), 2);
    let azul = first.team("azul").expect("azul");
    assert_eq!(azul.players.len(), 3);
    assert_eq!(azul.players[0].name, "joão silva");
    assert_eq!(azul.players[0].goals, 2);
    assert_eq!(azul.players[1].goals, 0);
    assert_eq!(azul.players[2].name, "marcos");
    assert_eq!(azul.players[2].goals, 1);

    let second = log.day("14/03/2025").expect("second day");
    assert_eq!(second.num_times, 3);
    assert_eq!(second.teams.len(), 3);
    assert_eq!(second.fixtures.len(), 3);

    let counts = log.team_counts();
    assert_eq!(counts.get("07/03/2025"), Some(&2));
    assert_eq!(counts.get("14/03/2025"), Some(&3));
}

#[test]
fn malformed_fixture_lines_are_reported_and_skipped() {
    let log = parse_match_log(&read_fixture("jogos.txt"));
    assert_eq!(log.issues.len(), 2);
    assert_eq!(log.issues[0].line_no, 33);
    assert_eq!(log.issues[0].kind, IssueKind::InvalidGoals);
    assert_eq!(log.issues[1].line_no, 34);
    assert_eq!(log.issues[1].kind, IssueKind::MalformedFixture);
    // The line after a bad one is still read.
    let text = "data: d\n# time - a\nx\n---\n# time - b\ny\n---\njogos:\nbroken - line\na 1 - 0 b\n";
    let log = parse_match_log(text);
    assert_eq!(log.issues.len(), 1);
    assert_eq!(log.days[0].fixtures.len(), 1);
}

#[test]
fn fixture_with_undeclared_team_is_dropped() {
    let text = "data: d\ntimes: 2\n# time - a\nx\n---\n# time - b\ny\n---\njogos:\na 1 - 0 z\n";
    let log = parse_match_log(text);
    assert!(log.days[0].fixtures.is_empty());
    assert_eq!(log.issues[0].kind, IssueKind::UnknownTeam("z".to_string()));
}

#[test]
fn data_line_resets_sections() {
    // The second block has no `jogos:` header, so its score-like line is ignored.
    let text = "data: d1\n# time - a\nx\n---\n# time - b\ny\n---\njogos:\na 1 - 0 b\ndata: d2\n# time - a\nx\n---\na 5 - 5 b\n";
    let log = parse_match_log(text);
    assert_eq!(log.days.len(), 2);
    assert!(log.days[1].fixtures.is_empty());
    assert_eq!(log.days[1].num_times, 1);
}

#[test]
fn lines_before_first_date_are_reported() {
    let log = parse_match_log("rodada extra\ndata: d\n");
    assert_eq!(log.issues.len(), 1);
    assert_eq!(log.issues[0].kind, IssueKind::OutsideMatchDay);
    assert_eq!(log.days.len(), 1);
}

#[test]
fn empty_text_has_no_days() {
    let log = parse_match_log("");
    assert!(log.is_empty());
    assert!(log.issues.is_empty());
}

#[test]
fn missing_log_file_is_no_data() {
    let loaded = load_match_log(&fixture_path("does_not_exist.txt")).expect("missing file is not an error");
    assert!(loaded.is_none());
    let loaded = load_match_log(&fixture_path("jogos.txt")).expect("fixture should load");
    assert_eq!(loaded.map(|l| l.days.len()), Some(2));
}

#[test]
fn repeated_date_replaces_earlier_block_in_place() {
    let text = "data: d\n# time - a\nx(1)\n---\ndata: e\n# time - b\ny\n---\ndata: d\n# time - c\nz(2)\n---\n";
    let log = parse_match_log(text);
    assert_eq!(log.dates(), vec!["d", "e"]);
    let day = &log.days[0];
    assert_eq!(day.teams.len(), 1);
    assert_eq!(day.teams[0].label, "c");
    assert_eq!(
        day.teams[0].players,
        vec![PlayerGoals {
            name: "z".to_string(),
            goals: 2
        }]
    );
    assert!(log.issues.is_empty());
}

#[test]
fn player_line_without_name_is_skipped() {
    let log = parse_match_log("data: d\n# time - a\nx\n(2)\n---\n");
    let team = &log.days[0].teams[0];
    assert_eq!(
        team.players,
        vec![PlayerGoals {
            name: "x".to_string(),
            goals: 0
        }]
    );
    assert_eq!(log.issues.len(), 1);
    assert_eq!(log.issues[0].line_no, 4);
    assert_eq!(log.issues[0].kind, IssueKind::MalformedPlayer);
}

#[test]
fn unreadable_team_count_falls_back_to_declared_teams() {
    let log = parse_match_log("data: d\ntimes: x\n# time - a\np\n---\n# time - b\nq\n---\n");
    assert_eq!(log.days[0].num_times, 2);
    assert_eq!(log.days[0].teams.len(), 2);
    assert_eq!(log.issues.len(), 1);
    assert_eq!(log.issues[0].line_no, 2);
    assert_eq!(log.issues[0].kind, IssueKind::InvalidTeamCount);
}

#[test]
fn team_header_without_label_is_reported() {
    // Players under the unlabelled header belong to no team.
    let log = parse_match_log("data: d\n# time\norphan\n# time - a\np\n---\n");
    let day = &log.days[0];
    assert_eq!(day.teams.len(), 1);
    assert_eq!(day.teams[0].label, "a");
    assert_eq!(day.player_count(), 1);
    assert_eq!(log.issues.len(), 1);
    assert_eq!(log.issues[0].line_no, 2);
    assert_eq!(log.issues[0].kind, IssueKind::MissingTeamLabel);
}
