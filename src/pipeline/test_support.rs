//! CSV fixtures shared by the pipeline tests.

use std::io;
use std::path::{Path, PathBuf};

pub(crate) fn write_csv(dir: &Path, name: &str, content: &str) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Writes a small primary dataset: two cities, three days, two samples per day.
///
/// Daily means in °C: Vancouver 10, 11, 12 and Portland 20, 21, (none).
pub(crate) fn write_primary_dataset(dir: &Path) -> io::Result<()> {
    write_csv(
        dir,
        "temperature.csv",
        "datetime,Vancouver,Portland\n\
         2012-10-01 00:00:00,282.15,292.15\n\
         2012-10-01 12:00:00,284.15,294.15\n\
         2012-10-02 00:00:00,283.15,293.15\n\
         2012-10-02 12:00:00,285.15,295.15\n\
         2012-10-03 00:00:00,284.15,\n\
         2012-10-03 12:00:00,286.15,\n",
    )?;
    write_csv(
        dir,
        "humidity.csv",
        "datetime,Vancouver,Portland\n\
         2012-10-01 00:00:00,70,50\n\
         2012-10-01 12:00:00,80,60\n\
         2012-10-02 00:00:00,75,\n\
         2012-10-02 12:00:00,85,\n\
         2012-10-03 00:00:00,90,40\n\
         2012-10-03 12:00:00,90,40\n",
    )?;
    write_csv(
        dir,
        "pressure.csv",
        "datetime,Vancouver,Portland\n\
         2012-10-01 00:00:00,1010,1020\n\
         2012-10-01 12:00:00,1012,1022\n\
         2012-10-02 00:00:00,1011,1021\n\
         2012-10-02 12:00:00,1013,1023\n\
         2012-10-03 00:00:00,1014,1024\n\
         2012-10-03 12:00:00,1016,1026\n",
    )?;
    write_csv(
        dir,
        "weather_description.csv",
        "datetime,Vancouver,Portland\n\
         2012-10-01 00:00:00,light rain,sky is clear\n\
         2012-10-01 12:00:00,light rain,mist\n\
         2012-10-02 00:00:00,mist,sky is clear\n\
         2012-10-02 12:00:00,fog,sky is clear\n\
         2012-10-03 00:00:00,,\n\
         2012-10-03 12:00:00,fog,\n",
    )?;
    write_csv(
        dir,
        "city_attributes.csv",
        "City,Country,Latitude,Longitude\n\
         Vancouver,Canada,49.24966,-123.119339\n\
         Portland,United States,45.523449,-122.676208\n",
    )?;
    Ok(())
}

/// Writes a secondary dataset with one city and a date the primary set lacks.
///
/// It mirrors every table of [`write_primary_dataset`] except the attributes.
pub(crate) fn write_secondary_dataset(dir: &Path) -> io::Result<()> {
    write_csv(
        dir,
        "temperature_european.csv",
        "datetime,Paris\n\
         2012-10-02 00:00:00,288.15\n\
         2012-10-04 00:00:00,289.15\n",
    )?;
    write_csv(
        dir,
        "humidity_european.csv",
        "datetime,Paris\n\
         2012-10-02 00:00:00,65\n\
         2012-10-04 00:00:00,66\n",
    )?;
    write_csv(
        dir,
        "pressure_european.csv",
        "datetime,Paris\n\
         2012-10-02 00:00:00,1015\n\
         2012-10-04 00:00:00,1017\n",
    )?;
    write_csv(
        dir,
        "weather_description_european.csv",
        "datetime,Paris\n\
         2012-10-02 00:00:00,overcast clouds\n\
         2012-10-04 00:00:00,light rain\n",
    )?;
    write_csv(
        dir,
        "city_attributes_european.csv",
        "City,Country,Latitude,Longitude\n\
         Paris,France,48.8566,2.3522\n",
    )?;
    Ok(())
}
