//! WebSocket session actor bridging the [`StatusFeed`] to one client.

use actix::prelude::*;
use actix_web_actors::ws;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::StatusEvent;
use crate::feed::{StatusFeed, SubscriptionId};

/// Internal message carrying a feed event into the actor context.
#[derive(Message)]
#[rtype(result = "()")]
struct Delivery(StatusEvent);

/// One authenticated WebSocket connection.
///
/// On start the session registers itself with the feed and pumps events from
/// its channel onto the socket; on stop it deregisters. Text pushed to the
/// client is the event wire payload, see [`StatusEvent::to_wire`].
pub struct StatusFeedSession {
    user_id: Uuid,
    feed: StatusFeed,
    subscription: Option<SubscriptionId>,
}

impl StatusFeedSession {
    pub fn new(user_id: Uuid, feed: StatusFeed) -> Self {
        Self {
            user_id,
            feed,
            subscription: None,
        }
    }
}

impl Actor for StatusFeedSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let addr = ctx.address();
        let feed = self.feed.clone();
        let user_id = self.user_id;

        tracing::debug!(%user_id, "status feed session opened");

        ctx.wait(
            async move { feed.subscribe(user_id, tx).await }
                .into_actor(self)
                .map(|subscription, act, _| {
                    act.subscription = Some(subscription);
                }),
        );

        actix_rt::spawn(async move {
            while let Some(event) = rx.recv().await {
                addr.do_send(Delivery(event));
            }
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(subscription) = self.subscription.take() {
            let feed = self.feed.clone();
            let user_id = self.user_id;
            actix_rt::spawn(async move {
                feed.unsubscribe(user_id, subscription).await;
            });
            tracing::debug!(%user_id, "status feed session closed");
        }
    }
}

impl Handler<Delivery> for StatusFeedSession {
    type Result = ();

    fn handle(&mut self, msg: Delivery, ctx: &mut Self::Context) {
        ctx.text(msg.0.to_wire().to_string());
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for StatusFeedSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => ctx.pong(&payload),
            Ok(ws::Message::Pong(_)) => {}
            // The feed is push-only; client text is ignored.
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {}
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
