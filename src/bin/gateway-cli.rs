use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the movie reviews public API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token for routes that need one
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// List movies
    Movies {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        /// One of year, title, avg_rating, rating_count
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },
    /// Show one movie
    Movie { id: String },
    /// List reviews of a movie
    Reviews {
        movie_id: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// List users
    Users {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        skip: u32,
    },
    /// Show one user
    User { id: String },
    /// Show the user owning the token
    Me,
    /// Exchange credentials for a token
    Login { username: String, password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/v1", cli.url.trim_end_matches('/'));

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url.trim_end_matches('/'))),
        Commands::Movies {
            limit,
            skip,
            sort,
            desc,
        } => {
            let mut query = vec![("limit", limit.to_string()), ("skip", skip.to_string())];
            if let Some(sort) = sort {
                query.push(("sort", sort));
                query.push(("sort_dir", if desc { "desc" } else { "asc" }.to_string()));
            }
            client.get(format!("{base}/movies")).query(&query)
        }
        Commands::Movie { id } => client.get(format!("{base}/movies/{id}")),
        Commands::Reviews { movie_id, limit } => client
            .get(format!("{base}/movies/{movie_id}/reviews"))
            .query(&[("limit", limit)]),
        Commands::Users { limit, skip } => client
            .get(format!("{base}/users"))
            .query(&[("limit", limit), ("skip", skip)]),
        Commands::User { id } => client.get(format!("{base}/users/{id}")),
        Commands::Me => client.get(format!("{base}/users/me")),
        Commands::Login { username, password } => client
            .post(format!("{base}/auth/authorize"))
            .form(&[("username", username), ("password", password)]),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {status}");
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {text}");
            }
        }
        return Ok(());
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{status}");
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
