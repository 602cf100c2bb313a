//! Response parsers.
//!
//! Each parser takes the raw text of one response and never fails: fields that are missing or
//! malformed are left as `None`.

/// Start and end markers that may wrap a server details block.
pub const SERVER_DETAILS_MARKERS: (&str, &str) = ("ServerDetails", "ServerDetailsEnd");

/// Start and end markers that may wrap a player data block.
pub const PLAYER_DATA_MARKERS: (&str, &str) = ("PlayerData", "PlayerDataEnd");

/// One online player from the `players` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Steam ID.
    pub id: String,
    pub name: String,
    /// Epic Online Services ID, when the server reports one.
    pub eos_id: Option<String>,
}

/// Typed view of a `server-details` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerDetails {
    pub name: Option<String>,
    pub map: Option<String>,
    pub max_players: Option<u32>,
    pub current_players: Option<u32>,
    pub has_password: Option<bool>,
    pub whitelist: Option<bool>,
    pub global_chat: Option<bool>,
    pub humans: Option<bool>,
    pub mutations: Option<bool>,
    pub ai: Option<bool>,
    pub queue: Option<bool>,
    pub day_length_minutes: Option<u32>,
    pub night_length_minutes: Option<u32>,
    pub playables: Option<Vec<String>>,
    pub raw: String,
}

/// Typed view of a `player-data` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerData {
    pub name: Option<String>,
    pub steam_id: Option<String>,
    pub class: Option<String>,
    pub growth: Option<f64>,
    pub health: Option<f64>,
    pub stamina: Option<f64>,
    pub hunger: Option<f64>,
    pub thirst: Option<f64>,
    pub raw: String,
}

/// Parses the columnar player list.
///
/// The response carries one attribute per line for every player: ids on the first line, names
/// on the second, EOS ids on the third. An optional header line comes first. The id column
/// decides how many records there are.
pub fn parse_player_list(raw: &str) -> Vec<PlayerRecord> {
    let mut lines = clean(raw)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .peekable();

    if lines.peek().map_or(false, |line| is_header(line)) {
        lines.next();
    }

    let columns: Vec<Vec<&str>> = lines.map(split_column).collect();
    let ids = match columns.first() {
        Some(ids) => ids,
        None => return Vec::new(),
    };
    let names = columns.get(1);
    let eos_ids = columns.get(2);

    ids.iter()
        .enumerate()
        .map(|(i, id)| PlayerRecord {
            id: id.to_string(),
            name: names
                .and_then(|col| col.get(i))
                .map(|name| name.to_string())
                .unwrap_or_default(),
            eos_id: eos_ids.and_then(|col| col.get(i)).map(|eos| eos.to_string()),
        })
        .collect()
}

// A header has no separators and is not itself a single bare id.
fn is_header(line: &str) -> bool {
    !line.contains(',') && !line.chars().all(|c| c.is_ascii_digit())
}

fn split_column(line: &str) -> Vec<&str> {
    line.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Splits a key/value block into `(key, value)` pairs in order of appearance.
///
/// Markers are stripped if present. Pairs may be separated by newlines or commas, and each
/// pair by `:` or `=`, whichever comes first. Keys are trimmed and lower-cased. A comma
/// segment without a separator continues the previous value, so list values such as
/// `Playables: A,B,C` stay intact.
pub fn parse_key_values(raw: &str, markers: Option<(&str, &str)>) -> Vec<(String, String)> {
    let mut body = clean(raw).trim();
    if let Some((start, end)) = markers {
        body = body.strip_prefix(start).unwrap_or(body);
        body = body.strip_suffix(end).unwrap_or(body);
    }

    let mut pairs: Vec<(String, String)> = Vec::new();
    for line in body.lines() {
        let mut line_has_pair = false;
        for segment in line.split(',') {
            match segment.find(|c: char| c == ':' || c == '=') {
                Some(pos) => {
                    let key = segment[..pos].trim().to_lowercase();
                    let value = segment[pos + 1..].trim().to_string();
                    if !key.is_empty() {
                        pairs.push((key, value));
                        line_has_pair = true;
                    }
                }
                None if line_has_pair => {
                    if let Some((_, value)) = pairs.last_mut() {
                        value.push(',');
                        value.push_str(segment.trim());
                    }
                }
                None => {}
            }
        }
    }

    pairs
}

pub fn parse_server_details(raw: &str) -> ServerDetails {
    let mut details = ServerDetails {
        raw: raw.to_string(),
        ..ServerDetails::default()
    };

    for (key, value) in parse_key_values(raw, Some(SERVER_DETAILS_MARKERS)) {
        match key.as_str() {
            "name" | "servername" => details.name = non_empty(value),
            "map" | "servermap" => details.map = non_empty(value),
            "maxplayers" | "servermaxplayers" => details.max_players = value.parse().ok(),
            "currentplayers" | "servercurrentplayers" | "players" => {
                details.current_players = value.parse().ok()
            }
            "password" | "serverpassword" | "haspassword" => {
                details.has_password = Some(truthy(&value))
            }
            "whitelist" | "bwhitelist" | "enablewhitelist" => details.whitelist = Some(truthy(&value)),
            "globalchat" | "benableglobalchat" | "enableglobalchat" => {
                details.global_chat = Some(truthy(&value))
            }
            "humans" | "benablehumans" | "enablehumans" => details.humans = Some(truthy(&value)),
            "mutations" | "benablemutations" | "enablemutations" => {
                details.mutations = Some(truthy(&value))
            }
            "ai" | "bspawnai" | "spawnai" => details.ai = Some(truthy(&value)),
            "queue" | "bqueueenabled" | "queueenabled" => details.queue = Some(truthy(&value)),
            "daylength" | "serverdaylengthminutes" | "daylengthminutes" => {
                details.day_length_minutes = value.parse().ok()
            }
            "nightlength" | "servernightlengthminutes" | "nightlengthminutes" => {
                details.night_length_minutes = value.parse().ok()
            }
            "playables" | "allowedclasses" => details.playables = Some(split_list(&value)),
            _ => {}
        }
    }

    details
}

pub fn parse_player_data(raw: &str) -> PlayerData {
    let mut data = PlayerData {
        raw: raw.to_string(),
        ..PlayerData::default()
    };

    for (key, value) in parse_key_values(raw, Some(PLAYER_DATA_MARKERS)) {
        match key.as_str() {
            "name" | "playername" => data.name = non_empty(value),
            "steamid" | "playerid" | "id" => data.steam_id = non_empty(value),
            "class" | "dinosaur" | "character" => data.class = non_empty(value),
            "growth" => data.growth = value.parse().ok(),
            "health" => data.health = value.parse().ok(),
            "stamina" => data.stamina = value.parse().ok(),
            "hunger" => data.hunger = value.parse().ok(),
            "thirst" => data.thirst = value.parse().ok(),
            _ => {}
        }
    }

    data
}

// Responses usually end with the frame terminator; some servers append line breaks too.
fn clean(raw: &str) -> &str {
    raw.trim_end_matches(|c: char| c == '\0' || c == '\r' || c == '\n')
}

fn truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn split_list(value: &str) -> Vec<String> {
    split_column(value).into_iter().map(String::from).collect()
}
