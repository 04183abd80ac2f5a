//! Built-in provisioning recipes
//!
//! Authored counterparts of the classic web-application fabfile tasks,
//! templated with `{{placeholders}}` resolved from the configuration:
//! `{{project}}`, `{{server_user}}`, `{{repo_dir}}`, `{{checkout_dir}}`,
//! `{{service}}` and `{{manage}}` (the management-command prefix).
//!
//! Every step a later step depends on carries a failure prompt, so a broken
//! database install cannot silently run into a migration attempt. Steps that
//! are genuinely idempotent-or-optional keep a prompt too; the operator is
//! the judge of "directory already exists" class failures on a re-run.

use super::{Recipe, RecipeStep};

/// Full server bootstrap: packages, database, process supervisor, reverse
/// proxy, migrations, service start
///
/// `env_exports` are `KEY=value` pairs appended to the server user's shell
/// profile so the application picks them up.
#[must_use]
pub fn bootstrap(env_exports: &[String]) -> Recipe {
    let mut recipe = Recipe::new("bootstrap", "provision a fresh application server")
        .with_step(RecipeStep::sudo(
            "apt-get update",
            "Couldn't update the package index, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "apt-get -y upgrade",
            "Couldn't upgrade installed packages, continue anyway?",
        ));

    for export in env_exports {
        let append = format!("echo \"export {export}\" >> ~/.bashrc");
        recipe = recipe.with_step(RecipeStep::remote(
            format!("sh -c {}", shell_words::quote(&append)),
            format!("Couldn't add {export} to the server profile, continue anyway?"),
        ));
    }

    recipe
        .with_step(RecipeStep::sudo(
            "apt-get -y install postgresql postgresql-contrib",
            "Couldn't install PostgreSQL, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "apt-get -y install libpq-dev python3-dev python3-venv",
            "Couldn't install the database client headers and runtime tooling, continue anyway?",
        ))
        .with_steps(setup_repo().steps)
        .with_step(RecipeStep::remote(
            "python3 -m venv {{checkout_dir}}/env",
            "Couldn't create the virtualenv, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "{{checkout_dir}}/env/bin/pip install -r {{checkout_dir}}/requirements.txt",
            "Couldn't install the application requirements, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "apt-get -y install supervisor",
            "Couldn't install supervisor, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "apt-get -y install nginx",
            "Couldn't install nginx, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "mkdir -p {{checkout_dir}}/logs",
            "Couldn't create the log directory, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "touch {{checkout_dir}}/logs/{{service}}_supervisor.log",
            "Couldn't create the supervisor log file, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "cp {{checkout_dir}}/{{project}}/conf/nginx /etc/nginx/sites-available/{{project}}",
            "Couldn't install the nginx site config, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "ln -s /etc/nginx/sites-available/{{project}} /etc/nginx/sites-enabled/{{project}}",
            "Couldn't enable the nginx site (already enabled?), continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "cp {{checkout_dir}}/{{project}}/conf/supervisord /etc/supervisor/conf.d/{{project}}.conf",
            "Couldn't install the supervisor config, continue anyway?",
        ))
        .with_step(RecipeStep::local(
            "{{manage}} migrate",
            "Couldn't apply database migrations, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "service nginx start",
            "Couldn't start nginx, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "supervisorctl reread",
            "Couldn't reread the supervisor config, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "supervisorctl update",
            "Couldn't update supervisor, continue anyway?",
        ))
        .with_step(RecipeStep::sudo(
            "supervisorctl restart {{service}}",
            "Couldn't restart {{service}}, continue anyway?",
        ))
}

/// Creates the bare repository and working checkout on the target host and
/// wires the local `production` remote
#[must_use]
pub fn setup_repo() -> Recipe {
    Recipe::new("setup-repo", "create the bare repository and working checkout")
        .with_step(RecipeStep::sudo(
            "apt-get -y install git",
            "Couldn't install git, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "mkdir -p {{repo_dir}}",
            "Couldn't create the bare repository directory, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "git init --bare {{repo_dir}}",
            "Couldn't initialize the bare repository, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "mkdir -p {{checkout_dir}}",
            "Couldn't create the working checkout directory, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "git init {{checkout_dir}}",
            "Couldn't initialize the working checkout, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "git -C {{checkout_dir}} remote add origin {{repo_dir}}",
            "Couldn't add the checkout's origin remote (already wired?), continue anyway?",
        ))
        .with_step(RecipeStep::local(
            "git remote add production ssh://{{server_user}}@{{host}}{{repo_dir}}",
            "Couldn't add the local production remote (already wired?), continue anyway?",
        ))
}

/// Commits local changes and pushes them through to the server checkout
///
/// The commit message is an operator-supplied free-text value; it is quoted
/// here so it travels as a single argument.
#[must_use]
pub fn update_code(commit_message: &str) -> Recipe {
    Recipe::new("push", "commit local changes and push them to the server")
        .with_step(RecipeStep::local(
            "sh -c 'pip freeze > requirements.txt'",
            "Couldn't freeze requirements, continue anyway?",
        ))
        .with_step(RecipeStep::local(
            "git add -A",
            "Couldn't stage local changes, continue anyway?",
        ))
        .with_step(RecipeStep::local(
            format!("git commit -m {}", shell_words::quote(commit_message)),
            "git commit failed (nothing to commit?), continue anyway?",
        ))
        .with_step(RecipeStep::local(
            "git push origin master",
            "Couldn't push to origin, continue anyway?",
        ))
        .with_step(RecipeStep::local(
            "git push production master",
            "Couldn't push to the production remote, continue anyway?",
        ))
        .with_step(RecipeStep::remote(
            "git -C {{checkout_dir}} pull origin master",
            "Couldn't update the server checkout, continue anyway?",
        ))
}

/// Pushes code and restarts the application service
#[must_use]
pub fn deploy(commit_message: &str) -> Recipe {
    let mut recipe = Recipe::new("deploy", "push code and restart the application service");
    recipe.steps = update_code(commit_message).steps;
    recipe.with_step(RecipeStep::sudo(
        "supervisorctl restart {{service}}",
        "Couldn't restart {{service}}, continue anyway?",
    ))
}

/// Applies database migrations, optionally for a single app
#[must_use]
pub fn migrate(app: Option<&str>) -> Recipe {
    let mut command = String::from("{{manage}} migrate");
    if let Some(app) = app {
        command.push(' ');
        command.push_str(&shell_words::quote(app));
    }
    Recipe::new("migrate", "apply database migrations").with_step(RecipeStep::local(
        command,
        "Couldn't apply database migrations, continue anyway?",
    ))
}

/// Generates database migrations from model changes
#[must_use]
pub fn makemigrations() -> Recipe {
    Recipe::new("makemigrations", "generate database migrations").with_step(RecipeStep::local(
        "{{manage}} makemigrations",
        "Couldn't generate migrations, continue anyway?",
    ))
}

/// Creates an administrative account interactively
#[must_use]
pub fn createsuperuser() -> Recipe {
    Recipe::new("createsuperuser", "create an administrative account").with_step(
        RecipeStep::local(
            "{{manage}} createsuperuser",
            "Couldn't create the administrative account, continue anyway?",
        ),
    )
}

/// Collects static assets for production serving
#[must_use]
pub fn collectstatic() -> Recipe {
    Recipe::new("collectstatic", "collect static assets").with_step(RecipeStep::local(
        "{{manage}} collectstatic --noinput",
        "Couldn't collect static assets, continue anyway?",
    ))
}

/// All built-in recipes, for listing and export
#[must_use]
pub fn all(env_exports: &[String]) -> Vec<Recipe> {
    vec![
        bootstrap(env_exports),
        setup_repo(),
        update_code("{{commit_message}}"),
        deploy("{{commit_message}}"),
        migrate(None),
        makemigrations(),
        createsuperuser(),
        collectstatic(),
    ]
}
