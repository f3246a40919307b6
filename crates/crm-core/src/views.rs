//! Pure presentation: HTML texts and keyboards for every message the bot
//! sends, plus the typed callback-data vocabulary. No state lives here.

use crate::{
    broadcast::BroadcastReport,
    catalog::{Catalog, Package},
    domain::{Client, ClientId, ClientStatus, ViewKind},
    formatting::{escape_html, format_amount, format_date},
    messaging::types::{InlineButton, InlineKeyboard},
    registry::Stats,
    session::NavDirection,
};

/// A decoded button press. Callback data is colon-delimited
/// (`nav:next:all`, `confirm:<id>`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelAction {
    /// Public: show one package's detail card.
    ShowPackage(String),
    /// Public: back from a package card to the menu.
    BackToPackages,
    Navigate { direction: NavDirection, view: ViewKind },
    /// The inert position indicator between prev/next.
    NavigateIgnore,
    Details(ClientId),
    ConfirmPayment(ClientId),
    BroadcastSendWithoutImage,
    BroadcastCancel,
}

impl PanelAction {
    pub fn parse(data: &str) -> Option<Self> {
        let (head, rest) = data.split_once(':')?;
        match head {
            "pkg" => match rest {
                "back" => Some(PanelAction::BackToPackages),
                code => Some(PanelAction::ShowPackage(code.to_string())),
            },
            "nav" => match rest.split_once(':') {
                None if rest == "pos" => Some(PanelAction::NavigateIgnore),
                Some((dir, view)) => {
                    let direction = match dir {
                        "prev" => NavDirection::Prev,
                        "next" => NavDirection::Next,
                        _ => return None,
                    };
                    Some(PanelAction::Navigate {
                        direction,
                        view: ViewKind::parse(view)?,
                    })
                }
                None => None,
            },
            "details" => Some(PanelAction::Details(ClientId(rest.to_string()))),
            "confirm" => Some(PanelAction::ConfirmPayment(ClientId(rest.to_string()))),
            "bcast" => match rest {
                "send" => Some(PanelAction::BroadcastSendWithoutImage),
                "cancel" => Some(PanelAction::BroadcastCancel),
                _ => None,
            },
            _ => None,
        }
    }

    /// Package browsing is open to everyone; the rest is operator-only.
    pub fn is_public(&self) -> bool {
        matches!(self, PanelAction::ShowPackage(_) | PanelAction::BackToPackages)
    }
}

fn status_line(status: ClientStatus) -> &'static str {
    match status {
        ClientStatus::Paid => "✅ Paid",
        ClientStatus::Pending => "⏳ Awaiting payment",
    }
}

fn package_label(catalog: &Catalog, code: &str) -> String {
    catalog
        .get(code)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| code.to_string())
}

// ---- public side ----

pub fn package_menu(catalog: &Catalog, user_name: &str) -> (String, InlineKeyboard) {
    let mut text = format!(
        "Hi, {}! 👋\n\n🎯 <b>Pick the package that fits you</b>\n\n\
         We have three options:\n\n",
        escape_html(user_name)
    );
    for pkg in catalog.iter() {
        text.push_str(&format!(
            "{} <b>{}</b> - {} sum\n   {}\n\n",
            pkg.emoji,
            escape_html(&pkg.code),
            format_amount(pkg.price),
            escape_html(&pkg.title)
        ));
    }
    text.push_str("👇 Tap a button for details");

    let keyboard = InlineKeyboard::one_per_row(
        catalog
            .iter()
            .map(|p| InlineButton::callback(p.name.clone(), format!("pkg:{}", p.code)))
            .collect(),
    );
    (text, keyboard)
}

pub fn package_info(pkg: &Package, contact_url: &str) -> (String, InlineKeyboard) {
    let text = format!(
        "{} <b>{}</b>\n\n💰 <b>Price: {} sum</b>\n\n{}\n\n\
         📞 To order, contact us or leave a request on the site!",
        pkg.emoji,
        escape_html(&pkg.name),
        format_amount(pkg.price),
        escape_html(&pkg.description)
    );
    let keyboard = InlineKeyboard::new(vec![
        vec![InlineButton::callback("◀️ Back to packages", "pkg:back")],
        vec![InlineButton::url("📞 Contact", contact_url)],
    ]);
    (text, keyboard)
}

// ---- admin side ----

pub fn admin_panel(
    catalog: &Catalog,
    user_name: &str,
    total: usize,
    paid: usize,
    pending: usize,
) -> String {
    let mut text = format!(
        "Hi, {}! 👋\n\n🔐 <b>Admin panel</b>\n\n📋 <b>Commands:</b>\n\
         /all - All clients\n/stats - Statistics and revenue\n\
         /pending - Awaiting payment\n/clients - Paid clients\n\
         /notify - Broadcast an announcement\n\n📊 <b>Packages:</b>\n",
        escape_html(user_name)
    );
    for pkg in catalog.iter() {
        text.push_str(&format!(
            "{} {} - {} sum\n",
            pkg.emoji,
            escape_html(&pkg.code),
            format_amount(pkg.price)
        ));
    }
    text.push_str(&format!(
        "\n📈 Total clients: <b>{total}</b>\n✅ Paid: <b>{paid}</b>\n⏳ Pending: <b>{pending}</b>"
    ));
    text
}

/// One client card in the paginated view. Position is 1-based.
pub fn client_card(
    catalog: &Catalog,
    client: &Client,
    index: usize,
    total: usize,
    view: ViewKind,
) -> (String, InlineKeyboard) {
    let status_emoji = match client.status {
        ClientStatus::Paid => "✅",
        ClientStatus::Pending => "⏳",
    };

    let mut text = format!(
        "{status_emoji} <b>Client {} of {total}</b>\n\n\
         👤 <b>Name:</b> {}\n📱 <b>Phone:</b> {}\n📦 <b>Package:</b> {}\n\
         💰 <b>Price:</b> {} sum\n📊 <b>Status:</b> {}\n📅 <b>Created:</b> {}",
        index + 1,
        escape_html(&client.first_name),
        escape_html(&client.phone),
        escape_html(&package_label(catalog, &client.package_code)),
        format_amount(client.price),
        status_line(client.status),
        format_date(client.created_at),
    );
    if let Some(paid_at) = client.paid_at {
        text.push_str(&format!("\n💳 <b>Paid:</b> {}", format_date(paid_at)));
    }

    let view_code = view.as_str();
    let mut rows = vec![
        vec![
            InlineButton::callback("⬅️", format!("nav:prev:{view_code}")),
            InlineButton::callback(format!("{}/{total}", index + 1), "nav:pos"),
            InlineButton::callback("➡️", format!("nav:next:{view_code}")),
        ],
        vec![InlineButton::callback(
            "📋 Details",
            format!("details:{}", client.id),
        )],
    ];
    if client.status == ClientStatus::Pending {
        rows.push(vec![InlineButton::callback(
            "✅ Confirm payment",
            format!("confirm:{}", client.id),
        )]);
    }

    (text, InlineKeyboard::new(rows))
}

/// Expanded standalone card, outside of pagination.
pub fn client_details(catalog: &Catalog, client: &Client) -> String {
    let mut text = format!(
        "📋 <b>CLIENT DETAILS</b>\n\n🆔 <b>ID:</b> {}\n👤 <b>Name:</b> {}\n\
         📱 <b>Phone:</b> {}\n📦 <b>Package:</b> {}\n💰 <b>Price:</b> {} sum\n\
         📊 <b>Status:</b> {}\n📅 <b>Created:</b> {}",
        escape_html(client.id.as_str()),
        escape_html(&client.first_name),
        escape_html(&client.phone),
        escape_html(&package_label(catalog, &client.package_code)),
        format_amount(client.price),
        status_line(client.status),
        format_date(client.created_at),
    );
    if let Some(paid_at) = client.paid_at {
        text.push_str(&format!("\n💳 <b>Paid:</b> {}", format_date(paid_at)));
    }
    if let Some(comment) = &client.comment {
        text.push_str(&format!("\n\n💬 <b>Comment:</b> {}", escape_html(comment)));
    }
    text
}

pub fn stats_message(catalog: &Catalog, stats: &Stats) -> String {
    let mut text = format!(
        "📊 <b>STATISTICS</b>\n\n👥 <b>Total clients:</b> {}\n\
         ✅ <b>Paid:</b> {}\n⏳ <b>Pending:</b> {}\n\n💰 <b>REVENUE</b>\n\
         📅 This month: <b>{} sum</b>\n💎 All time: <b>{} sum</b>\n\n\
         📦 <b>BY PACKAGE</b>\n",
        stats.total_clients,
        stats.paid_clients,
        stats.pending_clients,
        format_amount(stats.month_revenue),
        format_amount(stats.total_revenue),
    );

    for pkg_stats in &stats.per_package {
        if pkg_stats.count == 0 {
            continue;
        }
        text.push_str(&format!(
            "{}\n   Sold: {}\n   Revenue: {} sum\n\n",
            escape_html(&package_label(catalog, &pkg_stats.code)),
            pkg_stats.count,
            format_amount(pkg_stats.revenue),
        ));
    }

    if !stats.top_clients.is_empty() {
        text.push_str("🏆 <b>TOP CLIENTS</b>\n");
        for (i, client) in stats.top_clients.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} - {} sum\n",
                i + 1,
                escape_html(&client.first_name),
                format_amount(client.price),
            ));
        }
    }

    text
}

pub fn password_prompt(client: &Client) -> String {
    format!(
        "🔐 <b>Enter the password to confirm payment</b>\n\n\
         Client: {}\nAmount: {} sum\n\nSend /cancel to abort.",
        escape_html(&client.first_name),
        format_amount(client.price),
    )
}

pub fn payment_receipt(client: &Client) -> String {
    format!(
        "✅ <b>Payment confirmed!</b>\n\nClient: {}\nAmount: {} sum",
        escape_html(&client.first_name),
        format_amount(client.price),
    )
}

pub fn new_client_notice(catalog: &Catalog, client: &Client) -> String {
    format!(
        "🔔 <b>NEW CLIENT!</b>\n\n👤 {}\n📱 {}\n📦 {}\n💰 {} sum\n\n\
         Use /all to browse",
        escape_html(&client.first_name),
        escape_html(&client.phone),
        escape_html(&package_label(catalog, &client.package_code)),
        format_amount(client.price),
    )
}

// ---- broadcast ----

pub fn broadcast_text_prompt(subscriber_count: usize) -> String {
    format!(
        "📢 <b>Broadcast an announcement</b>\n\n👥 Subscribers: {subscriber_count}\n\n\
         📝 Send the message text you want to broadcast.\n\nSend /cancel to abort."
    )
}

pub fn broadcast_image_prompt() -> (String, InlineKeyboard) {
    let text = "✅ <b>Text received!</b>\n\n\
                📸 Now send an <b>image</b>, or use the button below to \
                broadcast without one."
        .to_string();
    let keyboard = InlineKeyboard::new(vec![
        vec![InlineButton::callback("📤 Send without image", "bcast:send")],
        vec![InlineButton::callback("❌ Cancel", "bcast:cancel")],
    ]);
    (text, keyboard)
}

pub fn broadcast_report(report: &BroadcastReport) -> String {
    format!(
        "✅ <b>Announcement sent!</b>\n\n📤 Delivered: {}\n❌ Failed: {}\n\
         👥 Total subscribers: {}",
        report.sent, report.failed, report.total
    )
}
