//! Routes inbound updates to lifecycle operations and reports results.
//!
//! Each handler returns an [`AppResult`]; the single place that turns an
//! error into a chat reply is [`Dispatcher::handle_update`].

use std::sync::Arc;

use grocery_core::error::CoreError;
use grocery_core::status::RequestStatus;
use grocery_core::types::{DbId, TelegramId};

use crate::commands::{self, Command};
use crate::error::{AppError, AppResult};
use crate::format;
use crate::lifecycle::{Actor, Lifecycle, NewMember};
use crate::notify::{notify_all, Notifier};
use crate::telegram::{Message, Update, User};

/// The bot's own account, from `getMe`.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: TelegramId,
    pub username: Option<String>,
}

/// Who sent a message, and where.
struct Context<'a> {
    chat_id: TelegramId,
    user: &'a User,
    actor: Actor,
    private: bool,
}

pub struct Dispatcher {
    lifecycle: Arc<Lifecycle>,
    notifier: Arc<dyn Notifier>,
    volunteer_chat_id: TelegramId,
    bot: BotIdentity,
}

impl Dispatcher {
    pub fn new(
        lifecycle: Arc<Lifecycle>,
        notifier: Arc<dyn Notifier>,
        volunteer_chat_id: TelegramId,
        bot: BotIdentity,
    ) -> Self {
        Self {
            lifecycle,
            notifier,
            volunteer_chat_id,
            bot,
        }
    }

    /// Handle one update. Never fails: errors become chat replies.
    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let chat_id = message.chat.id;

        if let Err(e) = self.handle_message(&message).await {
            if e.is_infrastructure() {
                tracing::error!(update_id = update.update_id, chat_id, error = %e, "Update failed");
            } else {
                tracing::debug!(update_id = update.update_id, chat_id, error = %e, "Update rejected");
            }
            self.reply(chat_id, &e.user_message()).await;
        }
    }

    async fn handle_message(&self, message: &Message) -> AppResult<()> {
        if let Some(members) = &message.new_chat_members {
            return self.handle_new_members(message.chat.id, members).await;
        }

        let Some(user) = &message.from else {
            return Ok(());
        };
        let ctx = Context {
            chat_id: message.chat.id,
            user,
            actor: Actor::new(user.id, user.full_name()),
            private: message.is_private(),
        };
        let text = message.text.as_deref().unwrap_or_default();

        match Command::parse(text, self.bot.username.as_deref()) {
            Some(command) => self.handle_command(&ctx, command).await,
            None => self.handle_text(&ctx, message, text).await,
        }
    }

    async fn handle_command(&self, ctx: &Context<'_>, command: Command) -> AppResult<()> {
        tracing::debug!(
            user_id = ctx.actor.id,
            chat_id = ctx.chat_id,
            command = command.name(),
            "Command"
        );

        match command {
            Command::Start => self.reply(ctx.chat_id, &format::start()).await,
            Command::Help => {
                let text = format::help(self.lifecycle.is_coordinator(ctx.actor.id));
                self.reply(ctx.chat_id, &text).await;
            }
            Command::List => {
                let open = self.lifecycle.open_requests().await?;
                self.reply(ctx.chat_id, &format::open_list(&open)).await;
            }
            Command::Claim(args) => self.claim(ctx, &args).await?,
            Command::Mine => {
                let mine = self.lifecycle.volunteer_requests(ctx.actor.id).await?;
                self.reply(ctx.chat_id, &format::my_requests(&mine)).await;
            }
            Command::Shopping(args) => self.shopping(ctx, &args).await?,
            Command::Done(args) => self.done(ctx, &args).await?,
            Command::Cancel(args) => self.cancel(ctx, &args).await?,
            Command::New(args) => self.new_request(ctx, &args).await?,
            Command::Retry(args) => {
                let id = require_id(&args, "/retry <request_id>")?;
                self.publish_and_post(ctx, id).await?;
            }
            Command::Status => {
                let counts = self.lifecycle.status_counts(ctx.actor.id).await?;
                self.reply(ctx.chat_id, &format::status_summary(&counts)).await;
            }
            Command::Approve(args) => self.approve(ctx, &args).await?,
            Command::Address(args) => self.address(ctx, &args).await?,
            Command::View(args) => self.view(ctx, &args).await?,
            Command::Unknown(_) => {
                self.reply(
                    ctx.chat_id,
                    "Unknown command. Use /help to see available commands.",
                )
                .await;
            }
        }
        Ok(())
    }

    /// Forwarded text from a coordinator becomes a new request. Anything
    /// else in a private chat gets a hint; group chatter is ignored.
    async fn handle_text(&self, ctx: &Context<'_>, message: &Message, text: &str) -> AppResult<()> {
        if message.is_forwarded()
            && self.lifecycle.is_coordinator(ctx.actor.id)
            && !text.trim().is_empty()
        {
            return self.submit_request(ctx, text).await;
        }
        if ctx.private {
            self.reply(ctx.chat_id, "Use /help to see available commands.")
                .await;
        }
        Ok(())
    }

    async fn handle_new_members(&self, chat_id: TelegramId, members: &[User]) -> AppResult<()> {
        if chat_id != self.volunteer_chat_id {
            return Ok(());
        }

        for member in members.iter().filter(|m| m.id != self.bot.id && !m.is_bot) {
            self.reply(chat_id, &format::welcome(&member.first_name))
                .await;

            let new_member = NewMember {
                id: member.id,
                username: member.username.clone().unwrap_or_default(),
                display_name: member.full_name(),
            };
            if let Err(e) = self.lifecycle.register_member(&new_member).await {
                tracing::error!(user_id = member.id, error = %e, "Failed to register volunteer");
            }

            let notice = format::new_member_notice(
                &new_member.display_name,
                &new_member.username,
                new_member.id,
            );
            self.notify_coordinators(&notice).await;
        }
        Ok(())
    }

    // ---- volunteer commands ----

    async fn claim(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        let id = require_id(args, "/claim <request_id>")?;
        let request = self.lifecycle.claim(&ctx.actor, id).await?;
        let address = self.lifecycle.address_for(ctx.actor.id, &request).await?;

        self.notifier
            .notify(
                ctx.actor.id,
                &format::claim_details(&request, address.as_deref()),
            )
            .await;
        if !ctx.private {
            self.reply(ctx.chat_id, &format::claim_ack(id, &ctx.actor.name))
                .await;
        }
        self.notify_coordinators(&format!("✋ Request #{id} claimed by {}", ctx.actor.name))
            .await;
        Ok(())
    }

    async fn shopping(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        let id = require_id(args, "/shopping <request_id>")?;
        self.lifecycle.start_shopping(ctx.actor.id, id).await?;

        self.reply(
            ctx.chat_id,
            &format!("🛒 Request #{id} marked as shopping. Use /done {id} when delivered."),
        )
        .await;
        self.notify_coordinators(&format!("🛒 {} is shopping for request #{id}", ctx.actor.name))
            .await;
        Ok(())
    }

    async fn done(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        let id = require_id(args, "/done <request_id>")?;
        self.lifecycle.complete(ctx.actor.id, id).await?;

        self.reply(
            ctx.chat_id,
            &format!("✅ Request #{id} marked as delivered. Thank you for helping!"),
        )
        .await;
        self.notify_coordinators(&format!("✅ Request #{id} delivered by {}", ctx.user.first_name))
            .await;
        self.notifier
            .notify(self.volunteer_chat_id, &format!("✅ Request #{id} delivered!"))
            .await;
        Ok(())
    }

    async fn cancel(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        let id = require_id(args, "/cancel <request_id>")?;
        self.lifecycle.request_cancellation(ctx.actor.id, id).await?;

        self.notify_coordinators(&format!(
            "⚠️ {} wants to cancel claim on request #{id}",
            ctx.user.first_name
        ))
        .await;
        self.reply(
            ctx.chat_id,
            "Cancellation request sent to coordinator. They will release the claim if appropriate.",
        )
        .await;
        Ok(())
    }

    async fn view(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        let id = require_id(args, "/view <request_id>")?;
        let request = self.lifecycle.request(id).await?;
        let address = self.lifecycle.address_for(ctx.actor.id, &request).await?;

        if matches!(request.status, RequestStatus::New | RequestStatus::Posted) {
            // Unclaimed: the public view goes to the chat, the address only
            // to a coordinator's DM.
            self.reply(ctx.chat_id, &format::request_view(&request, None))
                .await;
            if let Some(address) = address {
                self.notifier
                    .notify(ctx.actor.id, &format!("📍 Address for #{id}: {address}"))
                    .await;
            }
        } else {
            self.notifier
                .notify(
                    ctx.actor.id,
                    &format::request_view(&request, address.as_deref()),
                )
                .await;
            if !ctx.private {
                self.reply(ctx.chat_id, "📬 Details sent to your DM.").await;
            }
        }
        Ok(())
    }

    // ---- coordinator commands ----

    async fn new_request(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        if !self.lifecycle.is_coordinator(ctx.actor.id) {
            return Err(CoreError::NotCoordinator {
                user_id: ctx.actor.id,
            }
            .into());
        }
        if !ctx.private {
            return Err(AppError::BadRequest(
                "⚠️ Please send /new via DM to protect family information.".into(),
            ));
        }
        if args.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Usage: /new <spanish grocery list>\n\nExample:\n/new 2 libras de arroz, 1 pollo, 3 aguacates"
                    .into(),
            ));
        }
        self.submit_request(ctx, args).await
    }

    /// Create a request, then translate and post it.
    async fn submit_request(&self, ctx: &Context<'_>, text: &str) -> AppResult<()> {
        let request = self
            .lifecycle
            .create_request(ctx.actor.id, text, None, None)
            .await?;
        self.reply(
            ctx.chat_id,
            &format!("📝 Request #{} created. Translating...", request.id),
        )
        .await;
        self.publish_and_post(ctx, request.id).await
    }

    async fn publish_and_post(&self, ctx: &Context<'_>, id: DbId) -> AppResult<()> {
        let request = match self.lifecycle.publish(ctx.actor.id, id).await {
            Ok(request) => request,
            Err(CoreError::Translation(_)) => {
                self.reply(
                    ctx.chat_id,
                    &format!(
                        "⚠️ Translation failed for request #{id}. It has not been posted.\nTry again with /retry {id}"
                    ),
                )
                .await;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.notifier
            .notify(self.volunteer_chat_id, &format::posting_card(&request))
            .await;
        self.reply(
            ctx.chat_id,
            &format!(
                "✅ Request #{id} posted to volunteers.\n\nTo add address: /address {id} <address>"
            ),
        )
        .await;
        Ok(())
    }

    async fn approve(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        let volunteer_id: TelegramId = args
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest("Usage: /approve <telegram_user_id>".into()))?;
        self.lifecycle
            .approve_volunteer(ctx.actor.id, volunteer_id)
            .await?;

        self.reply(ctx.chat_id, &format!("✅ Volunteer {volunteer_id} approved."))
            .await;
        self.notifier
            .notify(
                volunteer_id,
                "✅ You're approved as a volunteer. Use /list to see open requests.",
            )
            .await;
        Ok(())
    }

    async fn address(&self, ctx: &Context<'_>, args: &str) -> AppResult<()> {
        if !self.lifecycle.is_coordinator(ctx.actor.id) {
            return Err(CoreError::NotCoordinator {
                user_id: ctx.actor.id,
            }
            .into());
        }
        if !ctx.private {
            return Err(AppError::BadRequest(
                "⚠️ Please send /address via DM to protect family information.".into(),
            ));
        }
        let (id, address) = commands::parse_address(args).ok_or_else(|| {
            AppError::BadRequest(
                "Usage: /address <request_id> <address>\nExample: /address 1 123 Main St, St Paul MN 55101"
                    .into(),
            )
        })?;
        self.lifecycle.save_address(ctx.actor.id, id, address).await?;

        self.reply(ctx.chat_id, &format!("✅ Address saved for request #{id}"))
            .await;
        Ok(())
    }

    // ---- private helpers ----

    async fn reply(&self, chat_id: TelegramId, text: &str) {
        self.notifier.notify(chat_id, text).await;
    }

    async fn notify_coordinators(&self, text: &str) {
        notify_all(
            self.notifier.as_ref(),
            self.lifecycle.coordinators().iter(),
            text,
        )
        .await;
    }
}

fn require_id(args: &str, usage: &str) -> AppResult<DbId> {
    commands::parse_id(args).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Usage: {usage}\nExample: {} 42",
            usage.split_whitespace().next().unwrap_or_default()
        ))
    })
}
