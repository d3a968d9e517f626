//! `drainadopt` - CLI for the storm drain adoption service
//!
//! This binary drives the drain views from the command line: notifications go
//! to stderr, rendered screens and `--json` output go to stdout.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use drainadopt::cli::{
    Cli, Command, ConfigCommand, DrainCommand, EditCommand, ImageCommand, LocationCommand,
    PickCommand,
};
use drainadopt::maps::{load_google_maps, LatLng, MapSdk, MapStatus};
use drainadopt::ui::{ConsoleNotifier, HistoryNavigator, TerminalConfirm};
use drainadopt::upload::{cloudinary_from_config, ImageHost, SelectedFile};
use drainadopt::views::{
    DrainDetail, DrainList, ImageUpload, ListState, LocationPicker, LocationViewer,
    SelectOutcome,
};
use drainadopt::{init_logging, Config, HttpDrainApi, Notifier, Route, ViewContext};

const USER_AGENT: &str = concat!("drainadopt/", env!("CARGO_PKG_VERSION"));

/// Shown in place of secrets by `config show`.
const REDACTED: &str = "********";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config_path = cli.config;
    let (app, ok) = match cli.command {
        // Config commands must work even when the configuration is broken
        Command::Config(cmd) => return handle_config(config_path, cmd),
        Command::Drain(cmd) => {
            let assume_yes = matches!(cmd, DrainCommand::Delete { yes: true, .. });
            let app = App::load(config_path, assume_yes)?;
            let ok = app.handle_drain(cmd).await?;
            (app, ok)
        }
        Command::Image(ImageCommand::Upload { file, current_url }) => {
            let app = App::load(config_path, false)?;
            let ok = app.handle_image_upload(file, current_url).await?;
            (app, ok)
        }
        Command::Location(cmd) => {
            let app = App::load(config_path, false)?;
            let ok = app.handle_location(cmd).await?;
            (app, ok)
        }
    };

    let errors = app.notifier.error_count();
    debug!(ok, errors, "Command finished");
    Ok(if ok && errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Everything a command needs, built once from the configuration.
#[derive(Debug)]
struct App {
    config: Config,
    http: reqwest::Client,
    ctx: ViewContext,
    notifier: Arc<ConsoleNotifier>,
    navigator: Arc<HistoryNavigator>,
}

impl App {
    fn load(config_path: Option<PathBuf>, assume_yes: bool) -> anyhow::Result<Self> {
        let config = Config::load_from(config_path).context("failed to load configuration")?;
        Self::new(config, assume_yes)
    }

    fn new(config: Config, assume_yes: bool) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        let api = HttpDrainApi::new(&config.api.base_url, http.clone())?;
        let notifier = Arc::new(ConsoleNotifier::new());
        let navigator = Arc::new(HistoryNavigator::new());

        let ctx = ViewContext {
            api: Arc::new(api),
            session: config.session(),
            notifier: notifier.clone(),
            navigator: navigator.clone(),
            confirm: Arc::new(TerminalConfirm::new(assume_yes)),
        };
        info!(api = %config.api.base_url, signed_in = ctx.session.is_authenticated(), "Client ready");

        Ok(Self {
            config,
            http,
            ctx,
            notifier,
            navigator,
        })
    }

    fn image_host(&self) -> anyhow::Result<Option<Arc<dyn ImageHost>>> {
        let client = cloudinary_from_config(&self.config.images, self.http.clone())?;
        Ok(client.map(|c| Arc::new(c) as Arc<dyn ImageHost>))
    }

    async fn handle_drain(&self, cmd: DrainCommand) -> anyhow::Result<bool> {
        match cmd {
            DrainCommand::List { json } => self.list_drains(json).await,
            DrainCommand::Show { id, json } => self.show_drain(id, json).await,
            DrainCommand::Adopt { id } => {
                let Some(mut view) = self.load_detail(id).await else {
                    return Ok(false);
                };
                view.adopt().await;
                if self.navigator.current() == Some(Route::Login) {
                    let err = drainadopt::Error::NotAuthenticated {
                        action: "adopt a drain",
                    };
                    self.notifier.error(&err.user_message());
                    eprintln!(
                        "Set session.user_id and session.token in {}",
                        Config::default_config_path().display()
                    );
                    return Ok(false);
                }
                print!("{}", view.render());
                Ok(true)
            }
            DrainCommand::Edit(edit) => self.edit_drain(edit).await,
            DrainCommand::Delete { id, .. } => {
                let Some(mut view) = self.load_detail(id).await else {
                    return Ok(false);
                };
                view.delete().await;
                if self.navigator.current() == Some(Route::DrainList) {
                    self.list_drains(false).await
                } else {
                    Ok(true)
                }
            }
        }
    }

    async fn list_drains(&self, json: bool) -> anyhow::Result<bool> {
        let mut view = DrainList::new(self.ctx.clone());
        view.mount().await;
        if let ListState::Failed(_) = view.state() {
            println!("{}", view.render());
            return Ok(false);
        }
        if json {
            println!("{}", serde_json::to_string_pretty(view.drains())?);
        } else {
            print!("{}", view.render());
        }
        Ok(true)
    }

    /// Fetch a drain into a detail view; `None` after printing the failure.
    async fn load_detail(&self, id: i64) -> Option<DrainDetail> {
        let mut view = DrainDetail::new(id, self.ctx.clone());
        view.mount().await;
        if view.drain().is_none() {
            println!("{}", view.render());
            return None;
        }
        Some(view)
    }

    async fn show_drain(&self, id: i64, json: bool) -> anyhow::Result<bool> {
        let Some(view) = self.load_detail(id).await else {
            return Ok(false);
        };
        let Some(drain) = view.drain() else {
            return Ok(false);
        };

        if json {
            println!("{}", serde_json::to_string_pretty(drain)?);
            return Ok(true);
        }

        print!("{}", view.render());
        let maps = match load_google_maps(&self.config.maps, self.http.clone()) {
            Err(drainadopt::Error::Maps(e)) if e.is_missing_api_key() => {
                debug!("No maps API key; skipping the location view");
                return Ok(true);
            }
            other => other,
        };
        if let Ok(maps) = &maps {
            if let Some(url) = view.embed_url(maps) {
                debug!(url = %url, "Embedded map");
            }
        }

        let mut viewer = LocationViewer::new(drain.latitude, drain.longitude, &drain.name)
            .with_geocode_timeout(self.config.geocode_timeout());
        viewer.sdk_loaded(maps.map(|m| -> Arc<dyn MapSdk> { m })).await;
        println!();
        print!("{}", viewer.render());
        Ok(true)
    }

    async fn edit_drain(&self, edit: EditCommand) -> anyhow::Result<bool> {
        let Some(mut view) = self.load_detail(edit.id).await else {
            return Ok(false);
        };
        if !edit.has_changes() {
            self.notifier.info("Nothing to change");
            return Ok(true);
        }

        view.start_editing();
        if !view.is_editing() {
            return Ok(false);
        }

        let uploaded = match &edit.image_file {
            Some(path) => {
                let current = view.drain().and_then(|d| d.image_url.clone());
                match self.upload_file(path, current.unwrap_or_default()).await? {
                    SelectOutcome::Uploaded(url) => Some(url),
                    _ => return Ok(false),
                }
            }
            None => None,
        };

        if let Some(form) = view.edit_form_mut() {
            if let Some(name) = edit.name {
                form.name = name;
            }
            if let Some(url) = uploaded.or(edit.image_url) {
                form.image_url = url;
            }
            if let (Some(lat), Some(lng)) = (edit.lat, edit.lng) {
                form.latitude = lat;
                form.longitude = lng;
            }
        }

        view.save_edit().await;
        if view.is_editing() {
            return Ok(false);
        }
        print!("{}", view.render());
        Ok(true)
    }

    async fn upload_file(&self, path: &Path, current_url: String) -> anyhow::Result<SelectOutcome> {
        let file = SelectedFile::from_path(path).await?;
        let mut view = ImageUpload::new(
            current_url,
            self.image_host()?,
            self.notifier.clone(),
            Box::new(|url: &str| debug!(url, "Image changed")),
        );
        let outcome = view.select_file(file).await;
        println!("{}", view.render());
        Ok(outcome)
    }

    async fn handle_image_upload(&self, file: PathBuf, current_url: String) -> anyhow::Result<bool> {
        let outcome = self.upload_file(&file, current_url).await?;
        Ok(matches!(outcome, SelectOutcome::Uploaded(_)))
    }

    fn map_sdk(&self) -> drainadopt::Result<Arc<dyn MapSdk>> {
        let maps: Arc<dyn MapSdk> = load_google_maps(&self.config.maps, self.http.clone())?;
        Ok(maps)
    }

    async fn handle_location(&self, cmd: LocationCommand) -> anyhow::Result<bool> {
        match cmd {
            LocationCommand::View { lat, lng, name } => {
                let mut viewer = LocationViewer::new(lat, lng, name)
                    .with_geocode_timeout(self.config.geocode_timeout());
                viewer.sdk_loaded(self.map_sdk()).await;
                print!("{}", viewer.render());
                Ok(viewer.status().is_ready())
            }
            LocationCommand::Pick(pick) => self.pick_location(pick).await,
        }
    }

    async fn pick_location(&self, pick: PickCommand) -> anyhow::Result<bool> {
        let initial = pick
            .lat
            .zip(pick.lng)
            .map(|(lat, lng)| LatLng::new(lat, lng));
        let mut picker = LocationPicker::new(
            initial,
            self.notifier.clone(),
            Box::new(|at: LatLng| println!("Selected {at}")),
        )
        .with_default_center(self.config.default_center())
        .with_geocode_timeout(self.config.geocode_timeout());

        match load_google_maps(&self.config.maps, self.http.clone()) {
            Ok(maps) => {
                picker = picker.with_geolocator(maps.clone());
                let sdk: Arc<dyn MapSdk> = maps;
                picker.sdk_loaded(Ok(sdk)).await;
            }
            Err(e) => picker.sdk_loaded(Err(e)).await,
        }
        if let MapStatus::LoadError(_) = picker.status() {
            println!("{}", picker.render());
            return Ok(false);
        }

        if let Some(at) = pick.at {
            if let [lat, lng] = at[..] {
                picker.click_map(lat, lng).await;
            }
        } else if let Some(query) = pick.search {
            let predictions = picker.search(&query).await.to_vec();
            match pick.choose {
                Some(n) => {
                    let Some(prediction) = n.checked_sub(1).and_then(|i| predictions.get(i)) else {
                        self.notifier
                            .error(&format!("No suggestion number {n} for \"{query}\""));
                        return Ok(false);
                    };
                    picker.select_place(&prediction.place_id).await;
                }
                None if predictions.is_empty() => {
                    self.notifier.info(&format!("No places found for \"{query}\""));
                }
                None => {}
            }
        } else if let Some(place_id) = pick.place_id {
            picker.select_place(&place_id).await;
        } else if pick.current {
            picker.use_current_location().await;
        }

        print!("{}", picker.render());
        Ok(picker.marker().is_some() || !picker.predictions().is_empty())
    }
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = redacted(Config::load_from(config_path)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Base URL:           {}", config.api.base_url);
                println!("  Timeout (secs):     {}", config.api.timeout_secs);
                println!();
                println!("[Maps]");
                println!("  API key:            {}", or_unset(config.maps.api_key.as_deref()));
                println!("  Geocode timeout:    {} ms", config.maps.geocode_timeout_ms);
                println!("  Default center:     {}", config.default_center());
                println!();
                println!("[Images]");
                println!("  Cloud name:         {}", or_unset(config.images.cloud_name.as_deref()));
                println!(
                    "  Upload preset:      {}",
                    or_unset(config.images.upload_preset.as_deref())
                );
                println!("  Folder:             {}", config.images.folder);
                println!();
                println!("[Session]");
                match config.session.user_id {
                    Some(id) => {
                        println!("  User ID:            {id}");
                        println!("  Role:               {}", config.session.role);
                        println!("  Token:              {}", or_unset(config.session.token.as_deref()));
                    }
                    None => println!("  Not signed in"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(config_path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn redacted(mut config: Config) -> Config {
    if config.maps.api_key.is_some() {
        config.maps.api_key = Some(REDACTED.to_string());
    }
    if config.session.token.is_some() {
        config.session.token = Some(REDACTED.to_string());
    }
    config
}

fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("(not set)")
}
