use rand::Rng;

#[derive(serde::Serialize)]
pub struct Context {
    pub title: String,
    pub users: Vec<User>,
}

#[derive(serde::Serialize)]
pub struct User {
    pub name: String,
    pub age: u32,
    pub is_disabled: bool,
}

/// A context with `n` users with random names and ages.
pub fn random(n: usize) -> Context {
    let mut rng = rand::thread_rng();
    let mut word = || -> String { (0..20).map(|_| rng.gen_range('a'..='z')).collect() };
    let title = word();
    let names: Vec<String> = (0..n).map(|_| word()).collect();
    let users = names
        .into_iter()
        .map(|name| User {
            name,
            age: rng.gen_range(21..100),
            is_disabled: rng.gen_ratio(1, 4),
        })
        .collect();
    Context { title, users }
}
