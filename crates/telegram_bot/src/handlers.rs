use engine::Caller;
use teloxide::{payloads::SendMessageSetters, prelude::*, types::ReplyParameters};

use crate::{ConfigParameters, parsing::parse_command_line, ui};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    if from.is_bot {
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(line) = parse_command_line(text, cfg.dispatcher.prefix()) else {
        return Ok(());
    };

    let caller = Caller::new(from.id.0, msg.chat.id.0);
    tracing::debug!(
        user = caller.user_id,
        chat = caller.chat_id,
        token = %line.token,
        "handling command"
    );

    let reply = cfg
        .dispatcher
        .dispatch(&caller, &line.token, &line.args)
        .await;

    bot.send_message(msg.chat.id, ui::render(&reply, &cfg.rendering))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}
