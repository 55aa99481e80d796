//! Static log corpora used across harnesses.
//!
//! Lines are shaped like a real `Client.txt`: a fixed header
//! (`date time counter thread [LEVEL Source pid]`) and a free-text body.
//! Each entry pairs a raw line with the category name it must classify as.

/// One representative line per category.
pub const CORPUS_CATEGORISED: &[(&str, &str)] = &[
    (
        "2025/11/04 19:24:34 188191812 3ef232c2 [INFO Client 7776] : TomHanksIndexFinger (Mercenary) is now level 2",
        "LevelUp",
    ),
    (
        "2025/11/04 19:25:02 188219921 3ef232c2 [INFO Client 7776] : Exile_42 has been slain.",
        "Death",
    ),
    (
        "2025/11/04 19:25:10 188228001 3ef232c2 [INFO Client 7776] $TradeBot: WTS Mirror of Kalandra",
        "Chat",
    ),
    (
        "2025/11/04 19:25:11 188229012 3ef232c2 [INFO Client 7776] #Wanderer: anyone doing the Trialmaster?",
        "Chat",
    ),
    (
        "2025/11/04 19:25:12 188230030 3ef232c2 [INFO Client 7776] &Mate: gg",
        "Chat",
    ),
    (
        "2025/11/04 19:25:13 188231044 3ef232c2 [INFO Client 7776] @From Buyer: Hi, I would like to buy your Tabula Rasa",
        "Chat",
    ),
    (
        "2025/11/04 19:25:14 188232050 3ef232c2 [INFO Client 7776] &: GUILD UPDATE: Mate has joined the guild",
        "GuildSystem",
    ),
    (
        "2025/11/04 19:25:15 188233061 3ef232c2 [INFO Client 7776] : Trade accepted.",
        "Trade",
    ),
    (
        "2025/11/04 19:25:20 188238111 3ef232c2 [INFO Client 7776] Una: The Ezomytes will not forget this.",
        "Dialogue",
    ),
    (
        "2025/11/04 19:25:21 188239222 3ef232c2 [INFO Client 7776] Siora, Blade of the Mists: Stand with me.",
        "Dialogue",
    ),
    (
        "2025/11/04 19:25:30 188248333 3ef232c2 [WARN Client 7776] [SHADER] Shader uses incorrect vertex layout",
        "Warning",
    ),
    (
        "2025/11/04 19:25:31 188249444 3ef232c2 [INFO Client 7776] [SHADER] Compiled 128 pipelines",
        "Graphics",
    ),
    (
        "2025/11/04 19:25:32 188250555 3ef232c2 [INFO Client 7776] [ENGINE] Init complete",
        "Engine",
    ),
    (
        "2025/11/04 19:25:33 188251666 3ef232c2 [INFO Client 7776] [SOUND] Output device changed",
        "Audio",
    ),
    (
        "2025/11/04 19:25:34 188252777 3ef232c2 [INFO Client 7776] Connecting to instance server at 10.0.0.1:6112",
        "Network",
    ),
    (
        "2025/11/04 19:25:35 188253888 3ef232c2 [INFO Client 7776] [Item Filter] Loaded filter 'Strict'",
        "ItemFilter",
    ),
    (
        "2025/11/04 19:25:36 188254999 3ef232c2 [INFO Client 7776] Successfully allocated passive skill id: life7",
        "Skill",
    ),
    (
        "2025/11/04 19:25:37 188256000 3ef232c2 [INFO Client 7776] You cannot use this item",
        "Gameplay",
    ),
    (
        "2025/11/04 19:25:38 188257111 3ef232c2 [INFO Client 7776] Joined guild named Wraeclast Rangers",
        "Guild",
    ),
    (
        "2025/11/04 19:25:39 188258222 3ef232c2 [INFO Client 7776] 88 89 90",
        "Unknown",
    ),
];

/// NPC lines that quote a system phrase. Every one must stay dialogue.
pub const CORPUS_QUOTED_SYSTEM_PHRASES: &[&str] = &[
    "Una: You cannot stop what is coming.",
    "Doryani: Not enough time remains, exile.",
    "Zana: Connecting to the Atlas is dangerous",
    "Navali: You have received a gift from fate",
    "Hilda: Trade accepted, then.",
    "Tujen: Joined guild named after my mother, once.",
];

/// Lines with a colon that must never read as dialogue.
pub const CORPUS_NOT_DIALOGUE: &[&str] = &[
    "Level 3: Lioneye's Watch",
    "Client version: 3.25.1",
    "Server: eu-west",
    "Has entered: the area",
    "lowercase speaker: hello there",
    "Gear: [Rare] [Helmet]",
    "Ratio: 12345 67890 1111",
];

/// Lines that do not have the header shape; they still become events.
pub const CORPUS_UNSTRUCTURED: &[&str] = &[
    "",
    "garbage without header",
    "2025/11/04 19:24:34 notanumber 3ef232c2 [INFO Client 7776] x",
    "2025/11/04 19:24:34 1 3ef232c2 INFO Client 7776 missing brackets",
];

/// Every raw line of [`CORPUS_CATEGORISED`], in order.
pub fn corpus_lines() -> Vec<&'static str> {
    CORPUS_CATEGORISED.iter().map(|(raw, _)| *raw).collect()
}

/// `n` distinct structured lines, one second apart, cycling through a few
/// categories. Used for throughput and ordering checks.
pub fn corpus_high_volume(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let body = match i % 5 {
                0 => format!(": Runner{i} has been slain."),
                1 => format!("#Chatter{i}: message number {i}"),
                2 => format!("[ENGINE] tick {i}"),
                3 => format!("Navali: Fate number {i} awaits"),
                _ => format!("Connecting to instance server {i}"),
            };
            LineBuilder::at_second(i).body(body).build()
        })
        .collect()
}

use super::builders::LineBuilder;
