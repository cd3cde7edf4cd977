use tracing::info;

use crate::contract::model::NewUser;
use crate::domain::repo::UsersRepository;

const SAMPLE_USERS: [(&str, &str, &str, &str, &str); 12] = [
    ("John Doe", "john.doe@example.com", "Tech Innovations Inc.", "123 Main Street", "San Francisco"),
    ("Jane Smith", "jane.smith@example.com", "Digital Solutions Ltd.", "456 Oak Avenue", "New York"),
    ("Michael Johnson", "michael.j@example.com", "Creative Designs Co.", "789 Pine Road", "Los Angeles"),
    ("Emily Davis", "emily.davis@example.com", "Global Enterprises", "321 Elm Street", "Chicago"),
    ("Robert Brown", "robert.brown@example.com", "Innovation Labs", "654 Maple Drive", "Boston"),
    ("Sarah Wilson", "sarah.w@example.com", "Future Systems Inc.", "987 Cedar Lane", "Seattle"),
    ("David Martinez", "david.martinez@example.com", "Smart Tech Solutions", "147 Birch Boulevard", "Austin"),
    ("Lisa Anderson", "lisa.anderson@example.com", "Cloud Dynamics", "258 Spruce Way", "Denver"),
    ("James Taylor", "james.taylor@example.com", "Data Systems Corp.", "369 Willow Court", "Miami"),
    ("Jennifer Lee", "jennifer.lee@example.com", "Modern Solutions LLC", "741 Ash Street", "Portland"),
    ("Christopher White", "chris.white@example.com", "NextGen Technologies", "852 Poplar Avenue", "Phoenix"),
    ("Amanda Harris", "amanda.harris@example.com", "Innovative Ventures", "963 Cherry Drive", "San Diego"),
];

/// The built-in sample directory, in insertion order.
pub fn sample_users() -> Vec<NewUser> {
    SAMPLE_USERS
        .iter()
        .map(|&(name, email, company, address, city)| NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            company: company.to_owned(),
            address: address.to_owned(),
            city: city.to_owned(),
        })
        .collect()
}

/// Insert the sample users when the store is empty.
/// Returns how many users were inserted.
pub async fn seed_if_empty(repo: &dyn UsersRepository) -> anyhow::Result<usize> {
    let existing = repo.count().await?;
    if existing > 0 {
        info!(existing, "Users table already populated, skipping seed");
        return Ok(0);
    }

    let users = sample_users();
    let total = users.len();
    for user in users {
        repo.insert(user).await?;
    }
    info!(inserted = total, "Seeded sample users");
    Ok(total)
}
