use super::*;

#[test]
fn parses_subscribe() {
    assert_eq!(
        Command::parse("subscribe follower_batt.lvl"),
        Ok(Command::Subscribe("follower_batt.lvl".to_string()))
    );
}

#[test]
fn parses_unsubscribe() {
    assert_eq!(
        Command::parse("unsubscribe leader_x_adcs.mag"),
        Ok(Command::Unsubscribe("leader_x_adcs.mag".to_string()))
    );
}

#[test]
fn tolerates_surrounding_whitespace() {
    assert_eq!(
        Command::parse("  subscribe follower_batt.lvl \n"),
        Ok(Command::Subscribe("follower_batt.lvl".to_string()))
    );
}

#[test]
fn rejects_unknown_verbs() {
    assert!(Command::parse("watch follower_batt.lvl").is_err());
    assert!(Command::parse("subscribe").is_err());
    assert!(Command::parse("subscribe   ").is_err());
    assert!(Command::parse("").is_err());
}
