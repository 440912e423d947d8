use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "imagefeed")]
#[command(about = "Browse and like Unsplash photos from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with Unsplash and manage the stored token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Show the photo feed
    Feed {
        /// Number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Like a photo
    Like {
        /// Photo ID
        id: String,
    },
    /// Remove your like from a photo
    Unlike {
        /// Photo ID
        id: String,
    },
    /// Show the signed-in profile
    Profile,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Print the authorization URL to open in a browser
    Url,
    /// Exchange the authorization code and store the token in the keychain
    Login {
        /// Redirect URL shown by the browser after granting access
        #[arg(value_name = "REDIRECT_URL", required_unless_present = "code", conflicts_with = "code")]
        redirect_url: Option<String>,
        /// Authorization code, when copied by hand
        #[arg(long, value_name = "CODE")]
        code: Option<String>,
    },
    /// Show whether a token is stored
    Status,
    /// Clear the stored token
    Logout,
}
