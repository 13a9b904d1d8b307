/// The SQL dialect family of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Mysql,
    Postgresql,
    Sqlite,
    Oracle,
    H2,
}

impl Flavor {
    pub fn name(&self) -> &'static str {
        match self {
            Flavor::Mysql => "mysql",
            Flavor::Postgresql => "postgresql",
            Flavor::Sqlite => "sqlite",
            Flavor::Oracle => "oracle",
            Flavor::H2 => "h2",
        }
    }
}
