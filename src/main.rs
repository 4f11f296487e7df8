use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use postdesk::api::HttpBackend;
use postdesk::config::{Cli, ColorChoice, Command, Config};
use postdesk::models::{Comment, CommentId, NewPost, PostId, PostPatch, UserId};
use postdesk::query_state::QueryStateStore;
use postdesk::state::PostsManager;
use postdesk::view::{self, Style};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    // Initialize logging; stdout is reserved for the rendered view
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Using API at {}", config.api.base_url);
    let backend = Arc::new(HttpBackend::new(&config.api.base_url, config.timeout())?);

    let style = Style {
        color: match cli.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stdout().is_terminal(),
        },
    };

    let query = match &cli.command {
        Command::List { query, .. } => query.clone().unwrap_or_default(),
        _ => String::new(),
    };
    let mut manager = PostsManager::new(
        backend,
        QueryStateStore::from_query(query),
        config.manager_options(),
    );

    let ok = run(&mut manager, cli.command, style).await?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Execute one command against the manager and print the resulting state.
/// Returns false when the operation left state unchanged.
async fn run(manager: &mut PostsManager, command: Command, style: Style) -> anyhow::Result<bool> {
    match command {
        Command::List {
            query: _,
            skip,
            limit,
            search,
            sort_by,
            order,
            tag,
            next,
            prev,
        } => {
            manager.set_filter(|f| {
                if let Some(skip) = skip {
                    f.skip = skip;
                }
                if let Some(limit) = limit {
                    f.limit = limit;
                }
                if let Some(search) = search {
                    f.search = search;
                }
                if let Some(sort_by) = sort_by {
                    f.sort_by = sort_by;
                }
                if let Some(order) = order {
                    f.sort_order = order;
                }
                if let Some(tag) = tag {
                    f.tag = tag;
                }
            });
            if next {
                manager.next_page();
            } else if prev {
                manager.previous_page();
            }

            let ok = manager.refresh().await;
            let filter = manager.filter();
            print!(
                "{}",
                view::render_posts(&manager.posts().await, manager.total().await, &filter, style)
            );
            println!("?{}", manager.query_string());
            Ok(ok)
        }

        Command::Tags => {
            let tags = manager.load_tags().await;
            print!("{}", view::render_tags(tags));
            Ok(!tags.is_empty())
        }

        Command::User { id } => match manager.user_info(UserId(id)).await {
            Some(user) => {
                print!("{}", view::render_user(&user));
                Ok(true)
            }
            None => Ok(false),
        },

        Command::Comments { post } => match manager.open_comments(PostId(post)).await {
            Some(comments) => {
                print!("{}", view::render_comments(comments, "", style));
                Ok(true)
            }
            None => Ok(false),
        },

        Command::AddPost {
            title,
            body,
            user_id,
        } => {
            let input = NewPost {
                title,
                body,
                user_id: UserId(user_id),
            };
            match manager.create_post(&input).await {
                Some(post) => {
                    print!("{}", view::render_post(&post));
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        Command::EditPost { id, title, body } => {
            if title.is_none() && body.is_none() {
                anyhow::bail!("Nothing to change: pass --title and/or --body");
            }
            let patch = PostPatch { title, body };
            match manager.update_post(PostId(id), &patch).await {
                Some(post) => {
                    print!("{}", view::render_post(&post));
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        Command::DeletePost { id } => {
            let ok = manager.delete_post(PostId(id)).await;
            if ok {
                println!("Deleted post {}", id);
            }
            Ok(ok)
        }

        Command::AddComment {
            post,
            body,
            user_id,
        } => {
            manager.open_comments(PostId(post)).await;
            let ok = manager.add_comment(&body, UserId(user_id)).await.is_some();
            print_comments(manager, PostId(post), style);
            Ok(ok)
        }

        Command::EditComment { post, id, body } => {
            let Some(mut comment) = find_comment(manager, PostId(post), CommentId(id)).await else {
                return Ok(false);
            };
            comment.body = body;
            let ok = manager.update_comment(&comment).await.is_some();
            print_comments(manager, PostId(post), style);
            Ok(ok)
        }

        Command::DeleteComment { post, id } => {
            manager.open_comments(PostId(post)).await;
            let ok = manager.delete_comment(CommentId(id), PostId(post)).await;
            print_comments(manager, PostId(post), style);
            Ok(ok)
        }

        Command::LikeComment { post, id } => {
            let Some(comment) = find_comment(manager, PostId(post), CommentId(id)).await else {
                return Ok(false);
            };
            let ok = manager.like_comment(&comment).await.is_some();
            print_comments(manager, PostId(post), style);
            Ok(ok)
        }
    }
}

async fn find_comment(
    manager: &mut PostsManager,
    post: PostId,
    id: CommentId,
) -> Option<Comment> {
    let found = manager
        .open_comments(post)
        .await?
        .iter()
        .find(|c| c.id == id)
        .cloned();
    if found.is_none() {
        tracing::error!("Comment {} not found on post {}", id, post);
    }
    found
}

fn print_comments(manager: &PostsManager, post: PostId, style: Style) {
    if let Some(comments) = manager.comments(post) {
        print!("{}", view::render_comments(comments, "", style));
    }
}
