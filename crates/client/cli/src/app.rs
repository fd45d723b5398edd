//! Glue code tying the in-memory API, the newsletter cell, and the terminal together.
use std::sync::Arc;

use anyhow::Result;
use client_api_core::{ApiError, InMemoryApiService};
use client_frontend_core::{EventConsumer, SettingsEventConsumer, SettingsViewModel};
use settings_runtime::{Event, NewsletterCell, NewsletterCellHandle, SessionEnv, Topic};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::config::CliConfig;
use crate::input::{self, InputCommand};
use crate::render::render;

pub struct SettingsApp {
    config: CliConfig,
    api: InMemoryApiService,
    cell: NewsletterCell,
}

pub struct SettingsAppBuilder {
    config: CliConfig,
}

impl SettingsAppBuilder {
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    pub async fn build(self) -> Result<SettingsApp> {
        let user = self.config.load_seed_user()?;
        let api = InMemoryApiService::new(user);

        let mut env = SessionEnv::new(Arc::new(api.clone()));
        if let Some(code) = &self.config.country_code {
            env = env.with_country_code(code.clone());
        }

        let cell = NewsletterCell::builder()
            .config(self.config.cell.clone())
            .env(env)
            .build()
            .await?;

        Ok(SettingsApp {
            config: self.config,
            api,
            cell,
        })
    }
}

/// One receiver per cell output.
struct Subscriptions {
    opt_in: broadcast::Receiver<Event>,
    switch: broadcast::Receiver<Event>,
    errors: broadcast::Receiver<Event>,
    users: broadcast::Receiver<Event>,
}

impl Subscriptions {
    fn new(handle: &NewsletterCellHandle) -> Self {
        Self {
            opt_in: handle.subscribe(Topic::OptInPrompt),
            switch: handle.subscribe(Topic::SwitchState),
            errors: handle.subscribe(Topic::SaveError),
            users: handle.subscribe(Topic::CurrentUser),
        }
    }

    /// Next event from any topic; `None` once the cell is gone.
    async fn recv(&mut self) -> Option<Event> {
        loop {
            let result = tokio::select! {
                r = self.opt_in.recv() => r,
                r = self.switch.recv() => r,
                r = self.errors.recv() => r,
                r = self.users.recv() => r,
            };
            match result {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event receiver lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl SettingsApp {
    pub fn builder(config: CliConfig) -> SettingsAppBuilder {
        SettingsAppBuilder::new(config)
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!("settings client starting...");

        let handle = self.cell.handle();
        let mut subscriptions = Subscriptions::new(&handle);
        let mut consumer = SettingsEventConsumer::new(
            SettingsViewModel::new(Some(self.config.topic)),
            self.config.frontend.clone(),
        );

        handle.set_topic(self.config.topic).await?;
        handle.on_ready().await?;

        println!("{}", input::HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !self.handle_input(&handle, &mut consumer, input::parse_line(&line)).await? {
                        break;
                    }
                }
                Some(event) = subscriptions.recv() => {
                    if consumer.on_event(&event).requires_redraw {
                        print!("{}", render(consumer.view_model(), consumer.message_log()));
                    }
                }
            }
        }

        drop(subscriptions);
        drop(handle);
        self.cell.shutdown().await?;
        tracing::info!("settings client stopped");
        Ok(())
    }

    /// Returns `false` when the user asked to quit.
    async fn handle_input(
        &self,
        handle: &NewsletterCellHandle,
        consumer: &mut SettingsEventConsumer,
        command: InputCommand,
    ) -> Result<bool> {
        match command {
            InputCommand::Toggle(on) => handle.on_topic_toggled(on).await?,
            InputCommand::ToggleAll(on) => handle.on_all_toggled(on).await?,
            InputCommand::SetTopic(topic) => {
                consumer.view_model_mut().set_controlled_topic(topic);
                handle.set_topic(topic).await?;
            }
            InputCommand::FailNextSave(message) => {
                let error = match message {
                    Some(message) => ApiError::message(message),
                    None => ApiError::Network("simulated outage".to_owned()),
                };
                self.api.fail_next_update(error);
                consumer.message_log_mut().push_text("next save will fail");
            }
            InputCommand::SlowNextSave(delay) => {
                self.api.delay_next_update(delay);
                consumer
                    .message_log_mut()
                    .push_text(format!("next save delayed by {}ms", delay.as_millis()));
            }
            InputCommand::Show => {
                print!("{}", render(consumer.view_model(), consumer.message_log()));
            }
            InputCommand::Help => println!("{}", input::HELP),
            InputCommand::Quit => return Ok(false),
            InputCommand::Unknown(line) => {
                println!("unknown command: {line} (try `help`)");
            }
            InputCommand::None => {}
        }
        Ok(true)
    }
}
