//! Command table and alias resolution.
//!
//! The table is built once at startup from [`CommandOptions`] and shared
//! read-only afterwards. Every canonical name resolves to itself and every
//! registered alias to its owner.

use std::collections::{BTreeMap, HashMap};

use unicode_normalization::UnicodeNormalization;

/// The canonical commands understood by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    Help,
    RecordInflow,
    RecordOutflow,
    ShowTotal,
    ClearRequest,
    ClearConfirm,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        Self::Help,
        Self::RecordInflow,
        Self::RecordOutflow,
        Self::ShowTotal,
        Self::ClearRequest,
        Self::ClearConfirm,
    ];

    /// The token users type for this command.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::RecordInflow => "uangmasuk",
            Self::RecordOutflow => "uangkeluar",
            Self::ShowTotal => "totaluang",
            Self::ClearRequest => "cleartransaksi",
            Self::ClearConfirm => "confirmclear",
        }
    }

    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Help => &["h", "bantuan", "?"],
            Self::RecordInflow => &["um", "in", "masuk"],
            Self::RecordOutflow => &["uk", "out", "keluar"],
            Self::ShowTotal => &["tu", "total", "saldo"],
            Self::ClearRequest => &["ct", "clear", "hapus"],
            Self::ClearConfirm => &["cc", "confirm"],
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Help => "Menampilkan daftar command yang tersedia",
            Self::RecordInflow => "Mencatat uang masuk. Contoh: ?um 10000",
            Self::RecordOutflow => "Mencatat uang keluar. Contoh: ?uk 5000",
            Self::ShowTotal => {
                "Menampilkan total saldo dan riwayat transaksi. Contoh: ?tu [halaman]"
            }
            Self::ClearRequest => "Memulai proses penghapusan semua transaksi",
            Self::ClearConfirm => "Mengkonfirmasi penghapusan semua transaksi",
        }
    }

    /// Argument shape, shown in usage errors.
    pub const fn arguments(self) -> &'static str {
        match self {
            Self::RecordInflow | Self::RecordOutflow => " <jumlah>",
            Self::ShowTotal => " [halaman]",
            Self::Help | Self::ClearRequest | Self::ClearConfirm => "",
        }
    }
}

/// The features that differ between deployments of the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandOptions {
    /// Register the short alias tokens (`um`, `tu`, ...).
    pub aliases: bool,
    /// Offer the `help` command.
    pub help: bool,
    /// Let `totaluang` take a page argument. Without it only page 1 is shown.
    pub pagination: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            aliases: true,
            help: true,
            pagination: true,
        }
    }
}

/// One entry of the help listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub name: &'static str,
    pub description: &'static str,
    pub aliases: Vec<&'static str>,
}

#[derive(Clone, Debug)]
pub struct CommandTable {
    options: CommandOptions,
    by_name: BTreeMap<&'static str, CommandSpec>,
    by_token: HashMap<&'static str, CommandKind>,
}

impl CommandTable {
    pub fn new(options: CommandOptions) -> Self {
        let mut by_name = BTreeMap::new();
        let mut by_token = HashMap::new();

        for kind in CommandKind::ALL {
            if kind == CommandKind::Help && !options.help {
                continue;
            }
            let aliases = if options.aliases {
                kind.aliases().to_vec()
            } else {
                Vec::new()
            };

            by_token.insert(kind.name(), kind);
            for alias in &aliases {
                by_token.insert(*alias, kind);
            }
            by_name.insert(
                kind.name(),
                CommandSpec {
                    kind,
                    name: kind.name(),
                    description: kind.description(),
                    aliases,
                },
            );
        }

        Self {
            options,
            by_name,
            by_token,
        }
    }

    pub fn options(&self) -> CommandOptions {
        self.options
    }

    /// Maps a typed token to its canonical command. Exact match only, after
    /// case folding.
    pub fn resolve(&self, token: &str) -> Option<CommandKind> {
        let token = normalize_token(token);
        let kind = self.by_token.get(token.as_str()).copied();
        tracing::debug!(token = %token, ?kind, "resolved command token");
        kind
    }

    pub fn get(&self, kind: CommandKind) -> Option<&CommandSpec> {
        self.by_name.get(kind.name())
    }

    /// Every registered command, sorted by canonical name.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.by_name.values()
    }

    /// `?uangmasuk <jumlah>` plus the alias list when aliases are on.
    pub fn usage(&self, kind: CommandKind, prefix: &str) -> String {
        let mut usage = format!("{prefix}{}{}", kind.name(), kind.arguments());
        if let Some(spec) = self.get(kind).filter(|s| !s.aliases.is_empty()) {
            let aliases: Vec<String> =
                spec.aliases.iter().map(|a| format!("{prefix}{a}")).collect();
            usage.push_str(&format!(" (alias: {})", aliases.join(", ")));
        }
        usage
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new(CommandOptions::default())
    }
}

/// NFKC then lowercase, so `ＵＭ` and `UM` both become `um`.
pub fn normalize_token(token: &str) -> String {
    token.trim().nfkc().collect::<String>().to_lowercase()
}
