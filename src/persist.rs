// used for persistence
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::sync::Mutex;
use tracing::info;

use crate::construct::{
    Colour, ColourId, Identity, Inventory, InventoryId, Part, PartId, Quantity, Set, SetId, Shape,
    ShapeId, User, UserId,
};
use crate::error::{BrickError, Result};
use crate::repository::BricksRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

impl PersistenceMode {
    /// `:memory:` (or nothing at all) selects an in-memory database, anything
    /// else is taken to be a file path.
    pub fn from_location(location: &str) -> Self {
        match location.trim() {
            "" | ":memory:" => Self::InMemory,
            path => Self::File(path.to_owned()),
        }
    }
}

// Identities live in SQLite as rowids, which are signed. No row ever has a
// negative key, so an identity that does not fit can never match anything.
fn key(id: Identity) -> i64 {
    i64::try_from(id).unwrap_or(-1)
}

fn identity(row: &Row, column: usize) -> rusqlite::Result<Identity> {
    Ok(row.get::<_, i64>(column)? as Identity)
}

const SCHEMA: &str = "
    create table if not exists Colour (
        Colour_Identity integer not null,
        Colour text not null,
        constraint referenceable_Colour_Identity primary key (
            Colour_Identity
        )
    );
    create table if not exists Shape (
        Shape_Identity integer not null,
        Shape text not null,
        constraint referenceable_Shape_Identity primary key (
            Shape_Identity
        )
    );
    create table if not exists Part (
        Part_Identity integer not null,
        Part text not null,
        Colour_Identity integer not null,
        Shape_Identity integer not null,
        constraint Part_has_Colour foreign key (
            Colour_Identity
        ) references Colour(Colour_Identity),
        constraint Part_has_Shape foreign key (
            Shape_Identity
        ) references Shape(Shape_Identity),
        constraint referenceable_Part_Identity primary key (
            Part_Identity
        )
    );
    create table if not exists LegoSet (
        LegoSet_Identity integer not null,
        LegoSet text not null,
        constraint referenceable_LegoSet_Identity primary key (
            LegoSet_Identity
        )
    );
    create table if not exists SetPart (
        LegoSet_Identity integer not null,
        Part_Identity integer not null,
        Quantity integer not null,
        constraint SetPart_in_LegoSet foreign key (
            LegoSet_Identity
        ) references LegoSet(LegoSet_Identity),
        constraint SetPart_is_Part foreign key (
            Part_Identity
        ) references Part(Part_Identity),
        constraint unique_SetPart primary key (
            LegoSet_Identity,
            Part_Identity
        )
    );
    create table if not exists Inventory (
        Inventory_Identity integer not null,
        constraint referenceable_Inventory_Identity primary key (
            Inventory_Identity
        )
    );
    create table if not exists InventoryPart (
        Inventory_Identity integer not null,
        Part_Identity integer not null,
        Quantity integer not null,
        constraint InventoryPart_in_Inventory foreign key (
            Inventory_Identity
        ) references Inventory(Inventory_Identity),
        constraint InventoryPart_is_Part foreign key (
            Part_Identity
        ) references Part(Part_Identity),
        constraint unique_InventoryPart primary key (
            Inventory_Identity,
            Part_Identity
        )
    );
    create table if not exists BrickUser (
        BrickUser_Identity integer not null,
        BrickUser text not null,
        Inventory_Identity integer not null,
        constraint BrickUser_owns_Inventory foreign key (
            Inventory_Identity
        ) references Inventory(Inventory_Identity),
        constraint referenceable_BrickUser_Identity primary key (
            BrickUser_Identity
        ),
        constraint unique_Inventory_owner unique (
            Inventory_Identity
        )
    );
";

// ------------- Persistence -------------
/// Repository over a single SQLite connection handed in by the caller. Every
/// operation holds the connection lock for its duration only, and every create
/// runs in its own transaction, rolled back if anything fails on the way.
pub struct SqliteRepository {
    connection: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn new(connection: Connection) -> Result<Self> {
        connection.execute_batch("pragma foreign_keys = on;")?;
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
    pub fn open(mode: &PersistenceMode) -> Result<Self> {
        let connection = match mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => Connection::open(path)?,
        };
        info!(?mode, "opened sqlite store");
        Self::new(connection)
    }

    fn required_parts(connection: &Connection, set: SetId) -> Result<Vec<(PartId, Quantity)>> {
        let mut statement = connection.prepare_cached(
            "
            select Part_Identity, Quantity
                from SetPart
                where LegoSet_Identity = ?
                order by Part_Identity
        ",
        )?;
        let parts = statement
            .query_map(params![key(set)], |row| Ok((identity(row, 0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(parts)
    }
    fn inventory(connection: &Connection, inventory: InventoryId) -> Result<Inventory> {
        let mut statement = connection.prepare_cached(
            "
            select Part_Identity, Quantity
                from InventoryPart
                where Inventory_Identity = ?
                order by Part_Identity
        ",
        )?;
        let parts = statement
            .query_map(params![key(inventory)], |row| Ok((identity(row, 0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(PartId, Quantity)>>>()?;
        Ok(Inventory::from_parts(parts).with_id(inventory))
    }

    fn sets_where(&self, filter: &str, argument: Option<&dyn ToSql>) -> Result<Vec<Set>> {
        let connection = self.connection.lock()?;
        let sql = format!(
            "select LegoSet_Identity, LegoSet from LegoSet {filter} order by LegoSet_Identity"
        );
        let mut statement = connection.prepare_cached(&sql)?;
        let heads = statement
            .query_map(params_from_iter(argument), |row| {
                Ok((identity(row, 0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let mut sets = Vec::with_capacity(heads.len());
        for (id, name) in heads {
            let set = Self::required_parts(&connection, id)?
                .into_iter()
                .fold(Set::new(name), |set, (part, quantity)| set.with_part(part, quantity));
            sets.push(set.with_id(id));
        }
        Ok(sets)
    }

    fn users_where(&self, filter: &str, argument: Option<&dyn ToSql>) -> Result<Vec<User>> {
        let connection = self.connection.lock()?;
        let sql = format!(
            "select BrickUser_Identity, BrickUser, Inventory_Identity from BrickUser {filter} order by BrickUser_Identity"
        );
        let mut statement = connection.prepare_cached(&sql)?;
        let heads = statement
            .query_map(params_from_iter(argument), |row| {
                Ok((identity(row, 0)?, row.get::<_, String>(1)?, identity(row, 2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let mut users = Vec::with_capacity(heads.len());
        for (id, name, inventory) in heads {
            let inventory = Self::inventory(&connection, inventory)?;
            users.push(User::new(name, inventory).with_id(id));
        }
        Ok(users)
    }

    fn part_exists(connection: &Connection, part: PartId) -> Result<bool> {
        let found = connection
            .prepare_cached("select Part_Identity from Part where Part_Identity = ?")?
            .query_row(params![key(part)], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn part_from_row(row: &Row) -> rusqlite::Result<Part> {
        Ok(Part::new(row.get::<_, String>(1)?, identity(row, 2)?, identity(row, 3)?)
            .with_id(identity(row, 0)?))
    }
}

impl BricksRepository for SqliteRepository {
    fn all_sets(&self) -> Result<Vec<Set>> {
        self.sets_where("", None)
    }
    fn set_by_id(&self, id: SetId) -> Result<Option<Set>> {
        let id = key(id);
        Ok(self
            .sets_where("where LegoSet_Identity = ?", Some(&id))?
            .into_iter()
            .next())
    }
    fn set_by_name(&self, name: &str) -> Result<Option<Set>> {
        Ok(self
            .sets_where("where LegoSet = ?", Some(&name))?
            .into_iter()
            .next())
    }

    fn all_users(&self) -> Result<Vec<User>> {
        self.users_where("", None)
    }
    fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let id = key(id);
        Ok(self
            .users_where("where BrickUser_Identity = ?", Some(&id))?
            .into_iter()
            .next())
    }
    fn user_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(self
            .users_where("where BrickUser = ?", Some(&name))?
            .into_iter()
            .next())
    }
    fn user_count(&self) -> Result<usize> {
        let connection = self.connection.lock()?;
        let count: i64 = connection.query_row("select count(*) from BrickUser", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn all_parts(&self) -> Result<Vec<Part>> {
        let connection = self.connection.lock()?;
        let mut statement = connection.prepare_cached(
            "
            select Part_Identity, Part, Colour_Identity, Shape_Identity
                from Part
                order by Part_Identity
        ",
        )?;
        let parts = statement
            .query_map([], Self::part_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(parts)
    }
    fn part_by_identity(&self, name: &str, colour: ColourId, shape: ShapeId) -> Result<Option<Part>> {
        let connection = self.connection.lock()?;
        let part = connection
            .prepare_cached(
                "
                select Part_Identity, Part, Colour_Identity, Shape_Identity
                    from Part
                    where Part = ?
                    and Colour_Identity = ?
                    and Shape_Identity = ?
                    order by Part_Identity
                    limit 1
            ",
            )?
            .query_row(params![name, key(colour), key(shape)], Self::part_from_row)
            .optional()?;
        Ok(part)
    }

    fn all_colours(&self) -> Result<Vec<Colour>> {
        let connection = self.connection.lock()?;
        let mut statement =
            connection.prepare_cached("select Colour_Identity, Colour from Colour order by Colour_Identity")?;
        let colours = statement
            .query_map([], |row| Ok(Colour::new(row.get::<_, String>(1)?).with_id(identity(row, 0)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(colours)
    }
    fn all_shapes(&self) -> Result<Vec<Shape>> {
        let connection = self.connection.lock()?;
        let mut statement =
            connection.prepare_cached("select Shape_Identity, Shape from Shape order by Shape_Identity")?;
        let shapes = statement
            .query_map([], |row| Ok(Shape::new(row.get::<_, String>(1)?).with_id(identity(row, 0)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(shapes)
    }

    fn create_colour(&self, colour: Colour) -> Result<Colour> {
        let connection = self.connection.lock()?;
        connection
            .prepare_cached("insert into Colour (Colour) values (?)")?
            .execute(params![colour.name()])?;
        let id = connection.last_insert_rowid() as Identity;
        Ok(colour.with_id(id))
    }
    fn create_shape(&self, shape: Shape) -> Result<Shape> {
        let connection = self.connection.lock()?;
        connection
            .prepare_cached("insert into Shape (Shape) values (?)")?
            .execute(params![shape.name()])?;
        let id = connection.last_insert_rowid() as Identity;
        Ok(shape.with_id(id))
    }
    fn create_part(&self, part: Part) -> Result<Part> {
        let connection = self.connection.lock()?;
        let colour_known = connection
            .prepare_cached("select Colour_Identity from Colour where Colour_Identity = ?")?
            .query_row(params![key(part.colour())], |row| row.get::<_, i64>(0))
            .optional()?
            .is_some();
        if !colour_known {
            return Err(BrickError::UnknownColour(part.colour()));
        }
        let shape_known = connection
            .prepare_cached("select Shape_Identity from Shape where Shape_Identity = ?")?
            .query_row(params![key(part.shape())], |row| row.get::<_, i64>(0))
            .optional()?
            .is_some();
        if !shape_known {
            return Err(BrickError::UnknownShape(part.shape()));
        }
        connection
            .prepare_cached(
                "
                insert into Part (
                    Part,
                    Colour_Identity,
                    Shape_Identity
                ) values (?, ?, ?)
            ",
            )?
            .execute(params![part.name(), key(part.colour()), key(part.shape())])?;
        let id = connection.last_insert_rowid() as Identity;
        Ok(part.with_id(id))
    }
    fn create_set(&self, set: Set) -> Result<Set> {
        let mut connection = self.connection.lock()?;
        let transaction = connection.transaction()?;
        for (part, _) in set.required_parts() {
            if !Self::part_exists(&transaction, part)? {
                return Err(BrickError::UnknownPart(part));
            }
        }
        transaction
            .prepare_cached("insert into LegoSet (LegoSet) values (?)")?
            .execute(params![set.name()])?;
        let id = transaction.last_insert_rowid() as Identity;
        {
            let mut add_part = transaction.prepare_cached(
                "
                insert into SetPart (
                    LegoSet_Identity,
                    Part_Identity,
                    Quantity
                ) values (?, ?, ?)
            ",
            )?;
            for (part, quantity) in set.required_parts() {
                add_part.execute(params![key(id), key(part), quantity])?;
            }
        }
        transaction.commit()?;
        Ok(set.with_id(id))
    }
    fn create_user(&self, user: User) -> Result<User> {
        let mut connection = self.connection.lock()?;
        let transaction = connection.transaction()?;
        for (part, _) in user.inventory().parts() {
            if !Self::part_exists(&transaction, part)? {
                return Err(BrickError::UnknownPart(part));
            }
        }
        transaction.execute("insert into Inventory default values", [])?;
        let inventory_id = transaction.last_insert_rowid() as Identity;
        {
            let mut add_part = transaction.prepare_cached(
                "
                insert into InventoryPart (
                    Inventory_Identity,
                    Part_Identity,
                    Quantity
                ) values (?, ?, ?)
            ",
            )?;
            for (part, quantity) in user.inventory().parts() {
                add_part.execute(params![key(inventory_id), key(part), quantity])?;
            }
        }
        transaction
            .prepare_cached("insert into BrickUser (BrickUser, Inventory_Identity) values (?, ?)")?
            .execute(params![user.name(), key(inventory_id)])?;
        let id = transaction.last_insert_rowid() as Identity;
        transaction.commit()?;
        let inventory = Inventory::from_parts(user.inventory().parts()).with_id(inventory_id);
        Ok(user.with_id(id).with_inventory(inventory))
    }
}
