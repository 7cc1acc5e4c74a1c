use std::fmt::Write;

use chrono_tz::Tz;
use engine::{
    Aggregate, CommandKind, CommandSpec, Currency, DispatchError, EngineError, Outcome, Page,
    Reply, StoreError, TransactionKind, ValidationError,
};

const TIME_FORMAT: &str = "%d %b %Y %H:%M";

/// How replies are turned into chat text.
#[derive(Clone, Debug)]
pub(crate) struct Rendering {
    pub currency: Currency,
    pub timezone: Tz,
    pub prefix: String,
    pub pagination: bool,
}

pub(crate) fn render(reply: &Reply, r: &Rendering) -> String {
    match reply {
        Ok(outcome) => render_outcome(outcome, r),
        Err(err) => render_error(err),
    }
}

fn render_outcome(outcome: &Outcome, r: &Rendering) -> String {
    match outcome {
        Outcome::Help(commands) => render_help(commands, r),
        Outcome::Recorded { kind, amount } => {
            let title = match kind {
                TransactionKind::Inflow => "💰 Uang Masuk",
                TransactionKind::Outflow => "💸 Uang Keluar",
            };
            format!("{title}\nJumlah: {}", r.currency.format(*amount))
        }
        Outcome::Summary { aggregate, page } => render_summary(aggregate, page, r),
        Outcome::ClearRequested { confirm_with } => format!(
            "⚠️ Konfirmasi Penghapusan\n\
             Apakah Anda yakin ingin menghapus SEMUA transaksi?\n\
             Data yang sudah dihapus TIDAK DAPAT dikembalikan!\n\n\
             Ketik {confirm_with} untuk mengkonfirmasi penghapusan."
        ),
        Outcome::Cleared => {
            "🗑️ Data Berhasil Dihapus\nSemua transaksi telah dihapus dari sistem.".to_string()
        }
    }
}

fn render_summary(aggregate: &Aggregate, page: &Page, r: &Rendering) -> String {
    let fmt = |amount| r.currency.format(amount);
    let mut text = format!(
        "📊 Ringkasan Keuangan\n\
         💰 Total Saldo: {}\n\
         📥 Total Masuk: {}\n\
         📤 Total Keluar: {}\n\
         📝 Jumlah Transaksi: {}\n\
         📄 Halaman: {} dari {}",
        fmt(aggregate.net),
        fmt(aggregate.total_in),
        fmt(aggregate.total_out),
        aggregate.count,
        page.page,
        page.total_pages,
    );

    if page.items.is_empty() {
        return text;
    }

    let _ = write!(
        text,
        "\n\n📝 Riwayat Transaksi (Halaman {}/{})",
        page.page, page.total_pages
    );
    for tx in &page.items {
        let symbol = match tx.kind {
            TransactionKind::Inflow => "➕",
            TransactionKind::Outflow => "➖",
        };
        let _ = write!(
            text,
            "\n{symbol} {} ({})",
            fmt(tx.amount),
            tx.timestamp.with_timezone(&r.timezone).format(TIME_FORMAT)
        );
    }

    if r.pagination && page.total_pages > 1 {
        let _ = write!(
            text,
            "\n\n💡 Gunakan {}{} <1-{}> untuk melihat halaman lain",
            r.prefix,
            CommandKind::ShowTotal.name(),
            page.total_pages
        );
    }
    text
}

fn render_help(commands: &[CommandSpec], r: &Rendering) -> String {
    let mut text = String::from(
        "📚 Bantuan Command\nBerikut adalah daftar command yang tersedia:\n",
    );
    for spec in commands {
        let _ = write!(text, "\n{}{}\n└ {}", r.prefix, spec.name, spec.description);
        if !spec.aliases.is_empty() {
            let aliases: Vec<String> = spec
                .aliases
                .iter()
                .map(|alias| format!("{}{alias}", r.prefix))
                .collect();
            let _ = write!(text, "\n└ Alias: {}", aliases.join(", "));
        }
        text.push('\n');
    }
    let _ = write!(
        text,
        "\nGunakan command dengan prefix '{}' | Contoh: {}{} 10000",
        r.prefix,
        r.prefix,
        commands
            .iter()
            .find(|spec| spec.kind == CommandKind::RecordInflow)
            .and_then(|spec| spec.aliases.first().copied())
            .unwrap_or(CommandKind::RecordInflow.name()),
    );
    text
}

fn render_error(err: &DispatchError) -> String {
    match err {
        DispatchError::PermissionDenied => {
            "⛔ Akses Ditolak\nAnda tidak memiliki izin untuk menggunakan command ini.".to_string()
        }
        DispatchError::UnrecognizedCommand { help, .. } => match help {
            Some(help) => format!(
                "Command Tidak Valid\nCommand tidak dikenali. Ketik {help} untuk melihat daftar command yang tersedia."
            ),
            None => "Command Tidak Valid\nCommand tidak dikenali.".to_string(),
        },
        DispatchError::Validation(ValidationError::Usage { usage }) => {
            format!("Format Salah\nGunakan: {usage}")
        }
        DispatchError::Validation(ValidationError::Amount(err)) => {
            let reason = match err {
                EngineError::InvalidAmount(_) => "Jumlah harus berupa angka",
                EngineError::AmountTooLarge => "Jumlah terlalu besar",
                EngineError::TotalsOverflow => {
                    "Total transaksi akan melebihi batas yang dapat dicatat"
                }
            };
            format!("Input Tidak Valid\n{reason}")
        }
        DispatchError::Validation(ValidationError::NotPositive(_)) => {
            "Input Tidak Valid\nJumlah harus lebih besar dari nol".to_string()
        }
        DispatchError::Storage(err) => {
            let action = match err {
                StoreError::Read { .. } | StoreError::Decode(_) => "memuat",
                StoreError::Write { .. } | StoreError::Encode(_) => "menyimpan",
            };
            format!("Error\nGagal {action} data: {err}")
        }
    }
}
