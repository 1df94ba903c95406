use std::{net::TcpListener, sync::Arc};

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    authentication::{AuthMiddleware, AuthService, CredentialHasher, JwtSigner},
    configuration::{DatabaseSettings, Settings},
    email_client::{EmailSender, SmtpEmailClient},
    error::ApiError,
    repository::{PgRepository, Repository},
    routes::{
        change_password, create_post, create_subreddit, delete_post, delete_subreddit,
        forgot_password, get_current_user, get_post, get_subreddit, list_posts, list_subreddits,
        login, logout, register, reset_password, update_subreddit,
    },
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        if configuration.jwt.secret.is_empty() {
            anyhow::bail!("The JWT signing secret must not be empty.");
        }

        let connection_pool = get_connection_pool(&configuration.database);
        let repository: Arc<dyn Repository> = Arc::new(PgRepository::new(connection_pool));
        let email_client: Arc<dyn EmailSender> =
            Arc::new(SmtpEmailClient::new(&configuration.email_client)?);
        let hasher = CredentialHasher::new(&configuration.password_hashing)?;
        let signer = Arc::new(JwtSigner::new(configuration.jwt.secret.as_bytes()));

        let state = AppState::new(
            repository,
            email_client,
            hasher,
            signer,
            configuration.application.frontend_url,
        );

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, state)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(configuration.connect_options())
}

/// Shared services handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub auth_service: Arc<AuthService>,
    pub signer: Arc<JwtSigner>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn Repository>,
        email_client: Arc<dyn EmailSender>,
        hasher: CredentialHasher,
        signer: Arc<JwtSigner>,
        frontend_url: String,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(
            repository.clone(),
            hasher,
            signer.clone(),
            email_client,
            frontend_url,
        ));
        Self {
            repository,
            auth_service,
            signer,
        }
    }
}

/// Registers app data, extractor error handlers and every route.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into());
        let query_config = web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into());
        let path_config = web::PathConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into());

        cfg.app_data(json_config)
            .app_data(query_config)
            .app_data(path_config)
            .app_data(Data::from(state.repository.clone()))
            .app_data(Data::from(state.auth_service.clone()))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/forgot-password", web::post().to(forgot_password))
                    .route("/reset-password", web::post().to(reset_password)),
            )
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::required(state.signer.clone()))
                    .route("/me", web::get().to(get_current_user))
                    .route("/logout", web::post().to(logout))
                    .route("/update-password", web::post().to(change_password))
                    .route("/subreddits", web::post().to(create_subreddit))
                    .route("/subreddits/{id}", web::put().to(update_subreddit))
                    .route("/subreddits/{id}", web::delete().to(delete_subreddit))
                    .route("/posts", web::post().to(create_post))
                    .route("/posts/{id}", web::delete().to(delete_post)),
            )
            .service(
                web::scope("/subreddits")
                    .wrap(AuthMiddleware::optional(state.signer.clone()))
                    .route("", web::get().to(list_subreddits))
                    .route("/{name}", web::get().to(get_subreddit)),
            )
            .service(
                web::scope("/posts")
                    .wrap(AuthMiddleware::optional(state.signer.clone()))
                    .route("", web::get().to(list_posts))
                    .route("/{id}", web::get().to(get_post)),
            );
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, anyhow::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure_app(state.clone()))
    })
    .listen(listener)?
    .run();
    Ok(server)
}
