use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use coursefind_cli::{
    init_tracing, load_context, render_language_trends, render_learning_methods, render_recommendation,
    render_role_summaries, render_trending, resolve_year, trending_courses,
};
use coursefind_core::config::Config;
use coursefind_core::types::Level;
use coursefind_recommend::{recommend, RecommendQuery};
use coursefind_trends::{analyze_learning_methods, analyze_roles, language_trends, summarize_roles, SurveyLoader};

#[derive(Parser)]
#[command(name = "coursefind")]
#[command(about = "Recommend online courses and explore technology trends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank courses whose skills mention a keyword
    Recommend {
        /// Keyword to look for in course skills
        keyword: String,
        /// Only courses of this level
        #[arg(long)]
        level: Option<Level>,
        /// Lowest accepted rating
        #[arg(long, default_value_t = 0.0)]
        min_rating: f32,
        /// Highest accepted rating
        #[arg(long, default_value_t = 5.0)]
        max_rating: f32,
        /// Only courses from this platform
        #[arg(long)]
        platform: Option<String>,
        /// Number of courses to return (default from config)
        #[arg(long)]
        top_n: Option<usize>,
        /// Weight of popularity in [0, 1] (default from config)
        #[arg(long)]
        popularity_weight: Option<f32>,
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print survey trend tables
    Trends {
        #[arg(value_enum)]
        table: TrendTable,
        /// Survey year (default: latest available)
        #[arg(long)]
        year: Option<i32>,
        /// Rows per table (default from config)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Recommend courses for the fastest-rising languages
    Trending {
        #[arg(long)]
        year: Option<i32>,
        /// How many rising languages to follow
        #[arg(long, default_value_t = 5)]
        languages: usize,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TrendTable {
    Languages,
    Roles,
    Learning,
}

fn main() -> Result<()> {
    init_tracing();
    let config = Config::load().context("loading configuration")?;
    let settings = config.settings()?;
    debug!(env = config.env_name(), "configuration loaded");

    match Cli::parse().command {
        Commands::Recommend { keyword, level, min_rating, max_rating, platform, top_n, popularity_weight, json } => {
            let ctx = load_context(&settings)?;
            let query = RecommendQuery::new(keyword.as_str())
                .with_level(level)
                .with_rating_range(min_rating, max_rating)
                .with_platform(platform)
                .with_top_n(top_n.unwrap_or(settings.recommend.top_n))
                .with_popularity_weight(popularity_weight.unwrap_or(settings.recommend.popularity_weight));
            let rec = recommend(&ctx, &query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                print!("{}", render_recommendation(&keyword, &rec));
            }
        }
        Commands::Trends { table, year, limit, json } => {
            let data = SurveyLoader::new().load_dir(&settings.surveys_path())?;
            let year = resolve_year(&data, year.or(settings.trends.year))?;
            let limit = limit.unwrap_or(settings.trends.limit);
            match table {
                TrendTable::Languages => {
                    let trends = language_trends(&data, year);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&trends)?);
                    } else {
                        print!("{}", render_language_trends(&trends, limit));
                    }
                }
                TrendTable::Roles => {
                    let summaries = summarize_roles(&analyze_roles(&data, year), 3);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&summaries)?);
                    } else {
                        print!("{}", render_role_summaries(year, &summaries, limit));
                    }
                }
                TrendTable::Learning => {
                    let methods = analyze_learning_methods(&data, year);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&methods)?);
                    } else {
                        print!("{}", render_learning_methods(year, &methods, limit));
                    }
                }
            }
        }
        Commands::Trending { year, languages, top_n, json } => {
            let data = SurveyLoader::new().load_dir(&settings.surveys_path())?;
            let year = resolve_year(&data, year.or(settings.trends.year))?;
            let trends = language_trends(&data, year);
            let ctx = load_context(&settings)?;
            let template = RecommendQuery::new(String::new())
                .with_top_n(top_n.unwrap_or(settings.recommend.top_n))
                .with_popularity_weight(settings.recommend.popularity_weight);
            let items = trending_courses(&ctx, &trends, languages, &template)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print!("{}", render_trending(&items));
            }
        }
    }
    Ok(())
}

