//! Tokenizes a raw input line into a [`UciCommand`].

#[derive(Debug, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(Vec<String>),
    SetOption(Vec<String>),
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

#[derive(Default, Debug, Clone)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movetime: Option<u64>,
    pub movestogo: Option<u64>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub ponder: bool,
    pub infinite: bool,
    pub search_moves: Vec<String>,
}

const GO_KEYWORDS: &[&str] = &[
    "wtime",
    "btime",
    "winc",
    "binc",
    "movetime",
    "movestogo",
    "depth",
    "nodes",
    "ponder",
    "infinite",
    "searchmoves",
];

#[inline]
fn parse_next<T: std::str::FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i + 1).and_then(|v| v.parse::<T>().ok())
}

#[must_use]
pub fn parse_go_params(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < parts.len() {
        let consumed = match parts[i] {
            "wtime" => {
                params.wtime = parse_next(parts, i);
                2
            }
            "btime" => {
                params.btime = parse_next(parts, i);
                2
            }
            "winc" => {
                params.winc = parse_next(parts, i);
                2
            }
            "binc" => {
                params.binc = parse_next(parts, i);
                2
            }
            "movetime" => {
                params.movetime = parse_next(parts, i);
                2
            }
            "movestogo" => {
                params.movestogo = parse_next(parts, i);
                2
            }
            "nodes" => {
                params.nodes = parse_next(parts, i);
                2
            }
            "depth" => {
                params.depth = parse_next(parts, i);
                2
            }
            "ponder" => {
                params.ponder = true;
                1
            }
            "infinite" => {
                params.infinite = true;
                1
            }
            "searchmoves" => {
                let mut j = i + 1;
                while j < parts.len() && !GO_KEYWORDS.contains(&parts[j]) {
                    params.search_moves.push(parts[j].to_string());
                    j += 1;
                }
                j - i
            }
            _ => 1,
        };
        i += consumed;
    }
    params
}

#[must_use]
pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    let owned_parts = || parts.iter().map(|p| (*p).to_string()).collect();

    let cmd = match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(owned_parts()),
        "go" => UciCommand::Go(owned_parts()),
        "setoption" => UciCommand::SetOption(owned_parts()),
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    };

    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_with_searchmoves_stops_at_next_keyword() {
        let parts: Vec<&str> = "go searchmoves e2e4 d2d4 depth 6"
            .split_whitespace()
            .collect();
        let params = parse_go_params(&parts);
        assert_eq!(params.search_moves, vec!["e2e4", "d2d4"]);
        assert_eq!(params.depth, Some(6));
    }

    #[test]
    fn go_with_time_controls() {
        let parts: Vec<&str> = "go wtime 60000 btime 55000 winc 1000 binc 1000 movestogo 20"
            .split_whitespace()
            .collect();
        let params = parse_go_params(&parts);
        assert_eq!(params.wtime, Some(60000));
        assert_eq!(params.movestogo, Some(20));
    }

    #[test]
    fn unknown_line_falls_back() {
        match parse_uci_command("wibble").unwrap() {
            UciCommand::Unknown(s) => assert_eq!(s, "wibble"),
            _ => panic!("expected Unknown"),
        }
    }

    #[test]
    fn blank_line_is_none() {
        assert!(parse_uci_command("   ").is_none());
    }
}
