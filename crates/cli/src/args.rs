use aicook_client::FeedSource;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aicook")]
#[command(version)]
#[command(about = "Browse recipe feeds and manage favorites from the terminal")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Backend base URL (overrides AICOOK_API_URL)
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,

    /// Bearer token of the signed-in user
    #[arg(long, global = true, env = "AICOOK_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the dishes of a feed with their favorite status
    Feed {
        #[command(subcommand)]
        feed: FeedCommand,
    },
    /// Flip the favorite flag of a dish
    Toggle {
        /// Dish id
        id: String,
    },
    /// Print the ids of all favorited dishes
    Favorites,
}

#[derive(Subcommand)]
pub(crate) enum FeedCommand {
    /// Trending dishes of the last week
    Trending {
        /// Also fetch following pages
        #[arg(short, long, default_value = "1")]
        pages: u32,
    },
    /// Today's suggestions
    Today {
        /// Personalize for this user id
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Search dishes; comma-separated terms search by ingredients
    Search { query: String },
    /// Dishes created by a user
    User { id: String },
    /// The signed-in user's favorites
    Favorites,
}

impl FeedCommand {
    pub(crate) fn source(&self) -> FeedSource {
        match self {
            FeedCommand::Trending { .. } => FeedSource::trending(),
            FeedCommand::Today { user } => FeedSource::TodaySuggestions {
                user_id: user.clone(),
            },
            FeedCommand::Search { query } => FeedSource::search(query.clone()),
            FeedCommand::User { id } => FeedSource::UserDishes {
                user_id: id.clone(),
            },
            FeedCommand::Favorites => FeedSource::Favorites,
        }
    }

    /// Pages to fetch; only the trending feed has more than one.
    pub(crate) fn pages(&self) -> u32 {
        match self {
            FeedCommand::Trending { pages } => (*pages).max(1),
            _ => 1,
        }
    }
}
