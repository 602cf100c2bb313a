//! The command registry.
//!
//! Every RCON command is identified by a string name on the client side and a single opcode
//! byte on the wire. The table below is the only place those two are related; it is built at
//! compile time and never changes.

use crate::RconError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A known RCON command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Command {
    Auth = 0x01,
    Command = 0x02,
    Announce = 0x10,
    DirectMessage = 0x11,
    ServerDetails = 0x12,
    WipeCorpses = 0x13,
    GetPlayables = 0x14,
    UpdatePlayables = 0x15,
    ToggleMigrations = 0x19,
    Ban = 0x20,
    ToggleGrowthMultiplier = 0x21,
    SetGrowthMultiplier = 0x22,
    ToggleNetUpdateChecks = 0x23,
    Kick = 0x30,
    Players = 0x40,
    Save = 0x50,
    Pause = 0x60,
    Custom = 0x70,
    PlayerData = 0x77,
    ToggleWhitelist = 0x81,
    WhitelistAdd = 0x82,
    WhitelistRemove = 0x83,
    ToggleGlobalChat = 0x84,
    ToggleHumans = 0x86,
    ToggleAi = 0x90,
    DisableAiClasses = 0x91,
    SetAiDensity = 0x92,
    QueueStatus = 0x93,
    ToggleAiLearning = 0x94,
}

/// Metadata describing a registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDefinition {
    pub command: Command,
    pub name: &'static str,
    pub opcode: u8,
    pub description: &'static str,
    pub requires_params: bool,
    pub example: Option<&'static str>,
}

/// Grouping of opcodes by contiguous byte range. Only used for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Core,
    Server,
    Player,
    World,
    Whitelist,
    Features,
    Ai,
}

const fn def(
    command: Command,
    name: &'static str,
    description: &'static str,
    requires_params: bool,
    example: Option<&'static str>,
) -> CommandDefinition {
    CommandDefinition {
        command,
        name,
        opcode: command as u8,
        description,
        requires_params,
        example,
    }
}

static REGISTRY: &[CommandDefinition] = &[
    def(Command::Auth, "auth", "Authenticate with the server password", true, None),
    def(Command::Command, "command", "Raw command packet", true, None),
    def(
        Command::Announce,
        "announce",
        "Broadcast a message to every player",
        true,
        Some("announce Server restart in 5 minutes"),
    ),
    def(
        Command::DirectMessage,
        "direct-message",
        "Send a message to one player",
        true,
        Some("direct-message 76561198000000000,Hello there"),
    ),
    def(Command::ServerDetails, "server-details", "Show server details", false, None),
    def(Command::WipeCorpses, "wipe-corpses", "Remove all corpses from the map", false, None),
    def(Command::GetPlayables, "get-playables", "List the playable classes", false, None),
    def(
        Command::UpdatePlayables,
        "update-playables",
        "Replace the playable class list",
        true,
        Some("update-playables Dryosaurus,Tenontosaurus"),
    ),
    def(Command::ToggleMigrations, "toggle-migrations", "Toggle migrations", false, None),
    def(
        Command::Ban,
        "ban",
        "Ban a player",
        true,
        Some("ban 76561198000000000,Cheating,0"),
    ),
    def(
        Command::ToggleGrowthMultiplier,
        "toggle-growth-multiplier",
        "Toggle the growth multiplier",
        false,
        None,
    ),
    def(
        Command::SetGrowthMultiplier,
        "set-growth-multiplier",
        "Set the growth multiplier",
        true,
        Some("set-growth-multiplier 1.5"),
    ),
    def(
        Command::ToggleNetUpdateChecks,
        "toggle-net-update-checks",
        "Toggle network update distance checks",
        false,
        None,
    ),
    def(
        Command::Kick,
        "kick",
        "Kick a player",
        true,
        Some("kick 76561198000000000,AFK"),
    ),
    def(Command::Players, "players", "List online players", false, None),
    def(Command::Save, "save", "Save the world", false, Some("save backup-01")),
    def(Command::Pause, "pause", "Pause or resume the server", false, None),
    def(
        Command::Custom,
        "custom",
        "Run a custom console command",
        true,
        Some("custom SetTimeOfDay 12"),
    ),
    def(Command::PlayerData, "player-data", "Show detailed player data", false, None),
    def(Command::ToggleWhitelist, "toggle-whitelist", "Toggle the whitelist", false, None),
    def(
        Command::WhitelistAdd,
        "whitelist-add",
        "Add players to the whitelist",
        true,
        Some("whitelist-add 76561198000000000"),
    ),
    def(
        Command::WhitelistRemove,
        "whitelist-remove",
        "Remove players from the whitelist",
        true,
        Some("whitelist-remove 76561198000000000"),
    ),
    def(Command::ToggleGlobalChat, "toggle-global-chat", "Toggle global chat", false, None),
    def(Command::ToggleHumans, "toggle-humans", "Toggle humans", false, None),
    def(Command::ToggleAi, "toggle-ai", "Toggle AI spawning", false, None),
    def(
        Command::DisableAiClasses,
        "disable-ai-classes",
        "Disable AI classes",
        true,
        Some("disable-ai-classes Compsognathus,Deer"),
    ),
    def(
        Command::SetAiDensity,
        "set-ai-density",
        "Set the AI spawn density",
        true,
        Some("set-ai-density 0.5"),
    ),
    def(Command::QueueStatus, "queue-status", "Show the join queue status", false, None),
    def(Command::ToggleAiLearning, "toggle-ai-learning", "Toggle AI learning", false, None),
];

impl Command {
    /// Every registered command, in opcode order.
    pub const ALL: [Command; 29] = [
        Command::Auth,
        Command::Command,
        Command::Announce,
        Command::DirectMessage,
        Command::ServerDetails,
        Command::WipeCorpses,
        Command::GetPlayables,
        Command::UpdatePlayables,
        Command::ToggleMigrations,
        Command::Ban,
        Command::ToggleGrowthMultiplier,
        Command::SetGrowthMultiplier,
        Command::ToggleNetUpdateChecks,
        Command::Kick,
        Command::Players,
        Command::Save,
        Command::Pause,
        Command::Custom,
        Command::PlayerData,
        Command::ToggleWhitelist,
        Command::WhitelistAdd,
        Command::WhitelistRemove,
        Command::ToggleGlobalChat,
        Command::ToggleHumans,
        Command::ToggleAi,
        Command::DisableAiClasses,
        Command::SetAiDensity,
        Command::QueueStatus,
        Command::ToggleAiLearning,
    ];

    pub fn opcode(self) -> u8 {
        self as u8
    }

    pub fn definition(self) -> &'static CommandDefinition {
        // Every variant has a row, in the same order as `ALL`.
        &REGISTRY[Command::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or_default()]
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    pub fn category(self) -> Category {
        Category::of(self.opcode())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        definition_for(s)
            .map(|def| def.command)
            .ok_or_else(|| RconError::InvalidCommand(format!("unknown command `{}`", s)).into())
    }
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Core,
        Category::Server,
        Category::Player,
        Category::World,
        Category::Whitelist,
        Category::Features,
        Category::Ai,
    ];

    /// Classifies an opcode by the byte range it falls in.
    pub fn of(opcode: u8) -> Category {
        match opcode {
            0x00..=0x0F => Category::Core,
            0x10..=0x2F => Category::Server,
            0x30..=0x4F => Category::Player,
            0x50..=0x7F => Category::World,
            0x80..=0x83 => Category::Whitelist,
            0x84..=0x8F => Category::Features,
            0x90..=0xFF => Category::Ai,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::Server => "server",
            Category::Player => "player",
            Category::World => "world",
            Category::Whitelist => "whitelist",
            Category::Features => "features",
            Category::Ai => "ai",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Looks up the opcode for a command name.
pub fn code_for(name: &str) -> Option<u8> {
    definition_for(name).map(|def| def.opcode)
}

/// Looks up the full definition for a command name.
pub fn definition_for(name: &str) -> Option<&'static CommandDefinition> {
    REGISTRY.iter().find(|def| def.name == name)
}

pub fn is_known(name: &str) -> bool {
    definition_for(name).is_some()
}

/// Names of every registered command.
pub fn all_commands() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|def| def.name)
}

pub fn definitions() -> &'static [CommandDefinition] {
    REGISTRY
}

/// Definitions whose opcode falls in the given category.
pub fn commands_in(category: Category) -> impl Iterator<Item = &'static CommandDefinition> {
    REGISTRY
        .iter()
        .filter(move |def| Category::of(def.opcode) == category)
}
