use std::fs;
use std::path::PathBuf;

use pelada::roster::{AttendeeSection, Player, PlayerDatabase, Position, parse_attendees, resolve_roster};
use pelada::skill::Attributes;
use pelada::storage;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn known_players() -> Vec<Player> {
    vec![
        Player::new(
            "Joao Silva",
            Position::Attacker,
            Position::Midfielder,
            Attributes {
                physical: 4,
                defense: 2,
                tactics: 3,
                speed: 5,
                technique: 4,
                attack: 5,
            },
        ),
        Player::new("ANA", Position::Defender, Position::Defender, Attributes::uniform(4)),
        Player::new("Bruno", Position::Midfielder, Position::Attacker, Attributes::uniform(2)),
        Player::new("Dudu", Position::Attacker, Position::Attacker, Attributes::uniform(5)),
    ]
}

#[test]
fn attendee_fixture_parses_both_sections() {
    let attendees = parse_attendees(&read_fixture("attendees.txt"));
    let names: Vec<&str> = attendees.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["João Silva", "Ana", "Bruno", "Zé Desconhecido", "Dudu"]);
    assert_eq!(attendees[0].section, AttendeeSection::Monthly);
    assert_eq!(attendees[4].section, AttendeeSection::Casual);
}

#[test]
fn unknown_attendee_gets_default_record_and_is_reported() {
    let attendees = parse_attendees(&read_fixture("attendees.txt"));
    let db = PlayerDatabase::from_players(known_players());
    let matched = resolve_roster(&attendees, &db);

    assert_eq!(matched.players.len(), attendees.len());
    assert_eq!(matched.unrecognized, vec!["Zé Desconhecido".to_string()]);

    let stranger = &matched.players[3];
    assert_eq!(stranger.name, "Zé Desconhecido");
    assert_eq!(stranger.attributes, Attributes::uniform(3));
    assert_eq!(stranger.primary, Position::Midfielder);
    assert_eq!(stranger.secondary, Position::Midfielder);
}

#[test]
fn known_attendees_copy_their_database_record() {
    let attendees = parse_attendees(&read_fixture("attendees.txt"));
    let db = PlayerDatabase::from_players(known_players());
    let matched = resolve_roster(&attendees, &db);

    // Accent and case differences still match.
    let joao = &matched.players[0];
    assert_eq!(joao.key, "joaosilva");
    assert_eq!(joao.primary, Position::Attacker);
    assert_eq!(joao.attributes.speed, 5);
    assert_eq!(matched.players[1].attributes, Attributes::uniform(4));
    assert_eq!(matched.players[4].name, "Dudu");
}

#[test]
fn nobody_is_dropped_with_an_empty_database() {
    let attendees = parse_attendees(&read_fixture("attendees.txt"));
    let matched = resolve_roster(&attendees, &PlayerDatabase::new());
    assert_eq!(matched.players.len(), 5);
    assert_eq!(matched.unrecognized.len(), 5);
}

#[test]
fn player_table_round_trips_through_sqlite() {
    let conn = storage::open_in_memory().expect("db");
    for p in known_players() {
        storage::upsert_player(&conn, &p).expect("upsert");
    }
    // A second import overwrites ratings rather than duplicating the row.
    let updated = Player::new("Ana", Position::Defender, Position::Midfielder, Attributes::uniform(1));
    storage::upsert_player(&conn, &updated).expect("upsert");

    let db = storage::load_player_database(&conn).expect("load");
    assert_eq!(db.len(), 4);
    let ana = db.lookup("ana").expect("ana");
    assert_eq!(ana.attributes, Attributes::uniform(1));
    assert_eq!(ana.secondary, Position::Midfielder);
    assert_eq!(db.lookup("João  Silva").map(|p| p.primary), Some(Position::Attacker));
}
